use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::animation::key::{AnimationKey, KeyInterpolation};

/// An ordered set of [`AnimationKey`]s for a single scalar channel.
///
/// Keys are kept sorted ascending by time. Sequences are editor-authored
/// and small, so insertion is linear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationSequence {
    keys: Vec<AnimationKey>,
}

impl AnimationSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a sequence from arbitrary keys, establishing the sort order.
    #[must_use]
    pub fn from_keys(keys: impl IntoIterator<Item = AnimationKey>) -> Self {
        let mut sequence = Self::new();
        for key in keys {
            sequence.add_key(key);
        }
        sequence
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Read-only view of the keys, ascending by time.
    #[must_use]
    pub fn keys(&self) -> &[AnimationKey] {
        &self.keys
    }

    #[must_use]
    pub fn get_key(&self, index: usize) -> Option<&AnimationKey> {
        self.keys.get(index)
    }

    /// Inserts a key, keeping ascending time order.
    ///
    /// A key at an exactly-equal time REPLACES the existing one
    /// (last-write-wins); duplicate times never coexist in a sequence.
    pub fn add_key(&mut self, key: AnimationKey) {
        let index = self.keys.partition_point(|k| k.time <= key.time);
        if index > 0 && self.keys[index - 1].time == key.time {
            self.keys[index - 1] = key;
        } else {
            self.keys.insert(index, key);
        }
    }

    /// Removes and returns the key at `index`, if it exists.
    pub fn remove_key_at(&mut self, index: usize) -> Option<AnimationKey> {
        if index < self.keys.len() {
            Some(self.keys.remove(index))
        } else {
            None
        }
    }

    /// Exact-time lookup, used by editors to detect "is there a keyframe
    /// exactly here".
    #[must_use]
    pub fn find_key(&self, time: f64) -> Option<&AnimationKey> {
        self.keys.iter().find(|k| k.time == time)
    }

    /// Changes the time and/or value of the key at `index`; re-sorts when
    /// the time changed. Returns `false` for an out-of-range index.
    pub fn modify_key(&mut self, index: usize, new_time: Option<f64>, new_value: Option<f64>) -> bool {
        let Some(mut key) = self.remove_key_at(index) else {
            return false;
        };
        if let Some(time) = new_time {
            key.time = time;
        }
        if let Some(value) = new_value {
            key.value = value;
        }
        self.add_key(key);
        true
    }

    /// Time of the last key, or 0 for an empty sequence.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.keys.last().map_or(0.0, |k| k.time)
    }

    /// Evaluates the sequence at the given time in milliseconds.
    ///
    /// Clamps outside the keyed range (no extrapolation); between two keys
    /// the span interpolates according to the left key's interpolation tag.
    /// An empty sequence evaluates to 0.
    #[must_use]
    pub fn evaluate(&self, time: f64) -> f64 {
        let Some(first) = self.keys.first() else {
            return 0.0;
        };
        if time <= first.time {
            return first.value;
        }
        let last = &self.keys[self.keys.len() - 1];
        if time >= last.time {
            return last.value;
        }

        // partition_point yields the first index with key.time > time.
        let next = self.keys.partition_point(|k| k.time <= time);
        let k0 = &self.keys[next - 1];
        let k1 = &self.keys[next];

        let dt = k1.time - k0.time;
        let t = if dt > 1e-6 { (time - k0.time) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match k0.interpolation {
            KeyInterpolation::Step => k0.value,
            KeyInterpolation::Linear => k0.value + (k1.value - k0.value) * t,
            KeyInterpolation::Cubic => {
                let t2 = t * t;
                let t3 = t2 * t;

                let s2 = -2.0 * t3 + 3.0 * t2;
                let s3 = t3 - t2;
                let s0 = 1.0 - s2;
                let s1 = s3 - t2 + t;

                let m0 = k0.slope_out * dt;
                let m1 = k1.slope_in * dt;

                s0 * k0.value + s1 * m0 + s2 * k1.value + s3 * m1
            }
        }
    }
}

// A sequence serializes as a plain JSON array of keys; the surrounding
// animation structure uses the array/object distinction to tell leaves from
// branches.

impl Serialize for AnimationSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.keys.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AnimationSequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<AnimationKey>::deserialize(deserializer).map(Self::from_keys)
    }
}
