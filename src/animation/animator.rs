use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::animation::animation::Animation;
use crate::errors::{ArborError, Result};
use crate::mutate::{AttributeType, Mutable, Mutator, MutatorAttributeTypes, MutatorValue};
use crate::scene::{Component, NodeKey};
use crate::serialization::Resource;
use crate::time::{Clock, FrameTick};

/// How playback proceeds along the timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Playmode {
    /// Restart at the beginning after reaching the end.
    #[default]
    Loop,
    /// Alternate between forward and backward every full period.
    PingPong,
    /// Like Loop, but backwards.
    ReverseLoop,
    /// Play once, then freeze on the last frame.
    PlayOnce,
    /// Play once, then freeze on the first frame.
    PlayOnceStopAfter,
    /// Do not advance at all; useful for jumping to positions.
    Stop,
}

impl Playmode {
    /// All variant names, for attribute-type reporting.
    pub const VARIANTS: &'static [&'static str] = &[
        "Loop",
        "PingPong",
        "ReverseLoop",
        "PlayOnce",
        "PlayOnceStopAfter",
        "Stop",
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Playmode::Loop => "Loop",
            Playmode::PingPong => "PingPong",
            Playmode::ReverseLoop => "ReverseLoop",
            Playmode::PlayOnce => "PlayOnce",
            Playmode::PlayOnceStopAfter => "PlayOnceStopAfter",
            Playmode::Stop => "Stop",
        }
    }

    #[must_use]
    pub fn from_str(name: &str) -> Option<Self> {
        match name {
            "Loop" => Some(Playmode::Loop),
            "PingPong" => Some(Playmode::PingPong),
            "ReverseLoop" => Some(Playmode::ReverseLoop),
            "PlayOnce" => Some(Playmode::PlayOnce),
            "PlayOnceStopAfter" => Some(Playmode::PlayOnceStopAfter),
            "Stop" => Some(Playmode::Stop),
            _ => None,
        }
    }

    /// Playback direction at the given (un-folded) local time:
    /// +1 forward, 0 frozen, -1 backward.
    #[must_use]
    pub fn direction(self, time: f64, total_time: f64) -> f64 {
        match self {
            Playmode::Stop => 0.0,
            Playmode::ReverseLoop => -1.0,
            Playmode::PingPong => {
                if total_time <= 0.0 {
                    0.0
                } else if ((time / total_time).floor() as i64).rem_euclid(2) == 0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Playmode::PlayOnce | Playmode::PlayOnceStopAfter => {
                if time > total_time { 0.0 } else { 1.0 }
            }
            Playmode::Loop => 1.0,
        }
    }
}

/// Playback precision: how the sample time is derived from the frame clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Playback {
    /// Sample at the exact scaled wall-clock time.
    #[default]
    Continuous,
    /// Wall-clock driven, but truncated to the animation's fps raster;
    /// stepped motion that may skip frames under load.
    RasteredFps,
    /// Advance exactly one `1000/fps` step per tick signal, ignoring wall
    /// time entirely; never skips or duplicates a logical frame.
    FrameBased,
}

impl Playback {
    /// All variant names, for attribute-type reporting.
    pub const VARIANTS: &'static [&'static str] = &["Continuous", "RasteredFps", "FrameBased"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Playback::Continuous => "Continuous",
            Playback::RasteredFps => "RasteredFps",
            Playback::FrameBased => "FrameBased",
        }
    }

    #[must_use]
    pub fn from_str(name: &str) -> Option<Self> {
        match name {
            "Continuous" => Some(Playback::Continuous),
            "RasteredFps" => Some(Playback::RasteredFps),
            "FrameBased" => Some(Playback::FrameBased),
            _ => None,
        }
    }
}

/// Result of advancing an [`Animator`] by one tick.
pub(crate) struct Sampled {
    /// Mutator to apply to the owning node; `None` when the sample time did
    /// not move (frozen playmode).
    pub mutator: Option<Mutator>,
    /// Names of timeline events crossed since the previous tick.
    pub events: Vec<String>,
}

/// Playback controller component.
///
/// Holds an [`Animation`] and drives it from the external frame clock:
/// every tick it derives the local sample time according to playmode and
/// playback precision, samples the structure into a mutator, and the
/// animation system applies that mutator to the owning node's components.
/// Activation follows the component lifecycle: attaching to a node
/// activates the controller, detaching (of the component or its node)
/// deactivates it.
#[derive(Debug, Clone)]
pub struct Animator {
    node: Option<NodeKey>,

    pub animation: Animation,
    pub playmode: Playmode,
    pub playback: Playback,
    /// Multiply the local clock rate with the graph's global time scale.
    pub scale_with_global: bool,

    speed_scale: f64,
    clock: Clock,
    last_time: f64,
    last_direction: f64,
    active: bool,
}

impl Animator {
    /// Serialization type tag.
    pub const TYPE: &'static str = "Animator";

    #[must_use]
    pub fn new(mut animation: Animation, playmode: Playmode, playback: Playback) -> Self {
        // The structure may have been edited since construction.
        animation.calculate_total_time();
        Self {
            node: None,
            animation,
            playmode,
            playback,
            scale_with_global: true,
            speed_scale: 1.0,
            clock: Clock::new(),
            last_time: 0.0,
            last_direction: 0.0,
            active: false,
        }
    }

    /// Controller-local speed factor.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed_scale
    }

    /// Sets the controller-local speed factor. The effective clock rate is
    /// recomputed on the next tick; accumulated local time never jumps.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed_scale = speed;
    }

    /// Whether the controller currently reacts to frame ticks.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Direction stored at the end of the previous tick.
    #[must_use]
    pub fn last_direction(&self) -> f64 {
        self.last_direction
    }

    /// Local time of the previous sample, on the un-folded timeline.
    #[must_use]
    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    /// Current local time, folded by the animation length.
    #[must_use]
    pub fn current_time(&self) -> f64 {
        let total = self.animation.total_time();
        if total <= 0.0 {
            0.0
        } else {
            self.clock.local_time() % total
        }
    }

    /// Jumps to a local time and returns the mutator sampled there, for
    /// immediate application.
    pub fn jump_to(&mut self, time: f64) -> Option<Mutator> {
        self.clock.set(time);
        self.last_time = time;
        let total = self.animation.total_time();
        if total <= 0.0 {
            return None;
        }
        let direction = self.playmode.direction(time, total);
        self.last_direction = direction;
        let mut folded = time % total;
        if direction < 0.0 {
            folded = total - folded;
        }
        Some(self.animation.sample(folded, self.playback))
    }

    /// Recomputes the local clock's rate from the speed factor and the
    /// graph's global time scale.
    pub(crate) fn sync_rate(&mut self, global_scale: f64) {
        let rate = self.speed_scale * if self.scale_with_global { global_scale } else { 1.0 };
        self.clock.set_rate(rate);
    }

    /// Advances the controller by one frame tick.
    ///
    /// Returns `None` while inactive, while the animation is empty
    /// (`total_time == 0`), or when neither the sample time moved nor any
    /// event fired. The very first tick after activation only anchors the
    /// wall clock.
    pub(crate) fn advance(&mut self, tick: &FrameTick) -> Option<Sampled> {
        if !self.active {
            self.clock.anchor(tick.time_ms);
            return None;
        }
        let total = self.animation.total_time();
        if total <= 0.0 {
            self.clock.anchor(tick.time_ms);
            return None;
        }

        let raw_time = match self.playback {
            Playback::FrameBased => {
                self.clock.anchor(tick.time_ms);
                self.last_time + self.animation.frame_time()
            }
            Playback::Continuous | Playback::RasteredFps => self.clock.tick(tick.time_ms),
        };

        let direction = self.playmode.direction(raw_time, total);
        let time = self.modal_time(raw_time, total);

        let events = self
            .animation
            .events_to_fire(self.last_time, time, self.playback, direction);

        let mutator = if time == self.last_time {
            None
        } else {
            self.last_time = time;
            let mut folded = time % total;
            if direction < 0.0 {
                folded = total - folded;
            }
            Some(self.animation.sample(folded, self.playback))
        };
        self.last_direction = direction;

        if mutator.is_none() && events.is_empty() {
            return None;
        }
        Some(Sampled { mutator, events })
    }

    /// Applies the playmode's end-of-timeline behavior to the raw time.
    fn modal_time(&self, time: f64, total: f64) -> f64 {
        match self.playmode {
            // Pinned to the previous sample; direction is 0 anyway.
            Playmode::Stop => self.last_time,
            // Freeze just short of the end so folding stays on the last frame.
            Playmode::PlayOnce if time >= total => total - 0.01,
            // Freeze just past the end so folding lands on the first frame.
            Playmode::PlayOnceStopAfter if time >= total => total + 0.01,
            _ => time,
        }
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(Animation::default(), Playmode::Loop, Playback::Continuous)
    }
}

impl Mutable for Animator {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn collect_fields(&self, mutator: &mut Mutator) {
        mutator.insert("playmode", self.playmode.as_str());
        mutator.insert("playback", self.playback.as_str());
        mutator.insert("speed_scale", self.speed_scale);
        mutator.insert("scale_with_global", self.scale_with_global);
    }

    fn apply_field(&mut self, name: &str, value: &MutatorValue) -> bool {
        match (name, value) {
            ("playmode", MutatorValue::String(s)) => {
                let Some(mode) = Playmode::from_str(s) else {
                    return false;
                };
                self.playmode = mode;
            }
            ("playback", MutatorValue::String(s)) => {
                let Some(mode) = Playback::from_str(s) else {
                    return false;
                };
                self.playback = mode;
            }
            ("speed_scale", MutatorValue::Number(n)) => self.speed_scale = *n,
            ("scale_with_global", MutatorValue::Bool(b)) => self.scale_with_global = *b,
            _ => return false,
        }
        true
    }

    fn mutator_attribute_types(&self, mutator: &Mutator) -> MutatorAttributeTypes {
        mutator
            .iter()
            .map(|(name, value)| {
                let ty = match name {
                    "playmode" => AttributeType::Enum(Playmode::VARIANTS),
                    "playback" => AttributeType::Enum(Playback::VARIANTS),
                    _ => match value {
                        MutatorValue::Bool(_) => AttributeType::Bool,
                        _ => AttributeType::Number,
                    },
                };
                (name.to_string(), ty)
            })
            .collect()
    }
}

impl Component for Animator {
    fn node(&self) -> Option<NodeKey> {
        self.node
    }

    fn set_node(&mut self, node: Option<NodeKey>) {
        self.node = node;
    }

    fn on_added(&mut self, _node: NodeKey) {
        self.active = true;
    }

    fn on_removed(&mut self) {
        self.active = false;
    }

    fn on_node_detached(&mut self) {
        self.active = false;
    }

    /// The animation is embedded inline, so a serialized node subtree is
    /// self-contained.
    fn serialize_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "animation": Resource::serialize_payload(&self.animation),
            "playmode": self.playmode.as_str(),
            "playback": self.playback.as_str(),
            "speed_scale": self.speed_scale,
            "scale_with_global": self.scale_with_global,
        })
    }

    fn deserialize_payload(&mut self, payload: &serde_json::Value) -> Result<()> {
        let animation_payload = payload
            .get("animation")
            .ok_or_else(|| ArborError::MissingField {
                type_name: Self::TYPE.to_string(),
                field: "animation".to_string(),
            })?;
        let mut animation = Animation::default();
        animation.deserialize_payload(animation_payload)?;
        self.animation = animation;

        self.playmode = payload
            .get("playmode")
            .and_then(serde_json::Value::as_str)
            .and_then(Playmode::from_str)
            .unwrap_or_default();
        self.playback = payload
            .get("playback")
            .and_then(serde_json::Value::as_str)
            .and_then(Playback::from_str)
            .unwrap_or_default();
        self.speed_scale = payload
            .get("speed_scale")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(1.0);
        self.scale_with_global = payload
            .get("scale_with_global")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(true);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
