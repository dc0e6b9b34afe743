use std::any::Any;

use rustc_hash::FxHashMap;

use crate::animation::animator::Playback;
use crate::animation::structure::AnimationStructure;
use crate::errors::{ArborError, Result};
use crate::mutate::{Mutable, Mutator, MutatorValue};
use crate::serialization::Resource;

/// A named, registrable animation resource.
///
/// Holds the [`AnimationStructure`], named labels (bookmark timestamps) and
/// named timeline events, the sampling frame rate and the derived total
/// time. The total time is NOT kept in sync automatically: editing the
/// structure's sequences directly requires an explicit
/// [`calculate_total_time`] afterwards. The editing helpers on this type do
/// it themselves.
///
/// [`calculate_total_time`]: Animation::calculate_total_time
#[derive(Debug, Clone)]
pub struct Animation {
    pub name: String,
    id: Option<String>,
    pub structure: AnimationStructure,
    labels: FxHashMap<String, f64>,
    events: FxHashMap<String, f64>,
    fps: f64,
    total_time: f64,
}

impl Animation {
    /// Serialization type tag.
    pub const TYPE: &'static str = "Animation";

    #[must_use]
    pub fn new(name: &str, structure: AnimationStructure, fps: f64) -> Self {
        let mut animation = Self {
            name: name.to_string(),
            id: None,
            structure,
            labels: FxHashMap::default(),
            events: FxHashMap::default(),
            fps,
            total_time: 0.0,
        };
        animation.calculate_total_time();
        animation
    }

    /// Sampling raster in milliseconds per frame.
    #[must_use]
    pub fn frame_time(&self) -> f64 {
        1000.0 / self.fps
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: f64) {
        self.fps = fps;
    }

    /// Derived duration: the maximum key time across all sequences, as of
    /// the last recompute.
    #[must_use]
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// (Re-)calculates the total time from the structure. Call after adding
    /// or removing keys directly on the sequences.
    pub fn calculate_total_time(&mut self) {
        self.total_time = self.structure.end_time();
    }

    // ========================================================================
    // Labels & timeline events
    // ========================================================================

    /// Sets a named timeline event at `time` milliseconds. Names are unique
    /// per animation.
    pub fn set_event(&mut self, name: &str, time: f64) {
        self.events.insert(name.to_string(), time);
    }

    pub fn remove_event(&mut self, name: &str) {
        self.events.remove(name);
    }

    #[must_use]
    pub fn event(&self, name: &str) -> Option<f64> {
        self.events.get(name).copied()
    }

    /// Sets a named label (a bookmark timestamp for editors and jumps).
    pub fn set_label(&mut self, name: &str, time: f64) {
        self.labels.insert(name.to_string(), time);
    }

    pub fn remove_label(&mut self, name: &str) {
        self.labels.remove(name);
    }

    #[must_use]
    pub fn label(&self, name: &str) -> Option<f64> {
        self.labels.get(name).copied()
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    /// Samples the structure at a time already folded into
    /// `[0, total_time]`.
    ///
    /// Continuous playback samples at the exact time; the rastered and
    /// frame-based modes truncate to the nearest lower multiple of the
    /// frame time first, producing stepped motion on the fps raster.
    #[must_use]
    pub fn sample(&self, folded_time: f64, playback: Playback) -> Mutator {
        let time = match playback {
            Playback::Continuous => folded_time,
            Playback::RasteredFps | Playback::FrameBased => {
                folded_time - folded_time % self.frame_time()
            }
        };
        self.structure.sample(time)
    }

    /// Names of the events to fire between `min` (inclusive) and `max`
    /// (exclusive) on the controller's un-folded local timeline.
    ///
    /// The range may span loop boundaries; it is split into per-period
    /// sections so wraparound crossings are detected. For backward play the
    /// triggers are mirrored to `total_time - t`; non-continuous playback
    /// rasters them to the frame grid. Results come back ordered by
    /// trigger time.
    #[must_use]
    pub fn events_to_fire(&self, min: f64, max: f64, playback: Playback, direction: f64) -> Vec<String> {
        if self.total_time <= 0.0 {
            return Vec::new();
        }

        let mut fired: Vec<(f64, String)> = Vec::new();
        let mut min_section = (min / self.total_time).floor();
        let max_section = (max / self.total_time).floor();
        let mut min_local = min % self.total_time;
        let max_local = max % self.total_time;

        while min_section <= max_section {
            let upper = if min_section == max_section {
                max_local
            } else {
                self.total_time
            };
            self.collect_events_between(min_local, upper, playback, direction, &mut fired);
            min_local = 0.0;
            min_section += 1.0;
        }

        fired.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        fired.into_iter().map(|(_, name)| name).collect()
    }

    fn collect_events_between(
        &self,
        min: f64,
        max: f64,
        playback: Playback,
        direction: f64,
        out: &mut Vec<(f64, String)>,
    ) {
        for (name, &time) in &self.events {
            let mut trigger = if direction < 0.0 {
                self.total_time - time
            } else {
                time
            };
            if playback != Playback::Continuous {
                trigger -= trigger % self.frame_time();
            }
            if min <= trigger && trigger < max {
                out.push((trigger, name.clone()));
            }
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new("", AnimationStructure::new(), 60.0)
    }
}

impl Mutable for Animation {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn collect_fields(&self, mutator: &mut Mutator) {
        mutator.insert("name", self.name.as_str());
        mutator.insert("fps", self.fps);
        mutator.insert("total_time", self.total_time);
    }

    fn reduce_mutator(&self, mutator: &mut Mutator) {
        // Derived; hidden from reflection so tooling cannot desync it.
        mutator.remove("total_time");
    }

    fn apply_field(&mut self, name: &str, value: &MutatorValue) -> bool {
        match (name, value) {
            ("name", MutatorValue::String(s)) => self.name = s.clone(),
            ("fps", MutatorValue::Number(n)) => self.fps = *n,
            _ => return false,
        }
        true
    }
}

impl Resource for Animation {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn serialize_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "fps": self.fps,
            "labels": self.labels,
            "events": self.events,
            "structure": self.structure,
        })
    }

    fn deserialize_payload(&mut self, payload: &serde_json::Value) -> Result<()> {
        self.id = payload
            .get("id")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        self.name = payload
            .get("name")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ArborError::MissingField {
                type_name: Self::TYPE.to_string(),
                field: "name".to_string(),
            })?
            .to_string();
        self.fps = payload
            .get("fps")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(60.0);
        self.labels = match payload.get("labels") {
            Some(value) => serde_json::from_value(value.clone())?,
            None => FxHashMap::default(),
        };
        self.events = match payload.get("events") {
            Some(value) => serde_json::from_value(value.clone())?,
            None => FxHashMap::default(),
        };
        self.structure = match payload.get("structure") {
            Some(value) => serde_json::from_value(value.clone())?,
            None => AnimationStructure::new(),
        };
        self.calculate_total_time();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
