use serde::{Deserialize, Serialize};

use crate::mutate::{AttributeType, Mutable, Mutator, MutatorAttributeTypes, MutatorValue};

/// Interpolation used on the span between a key and its successor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyInterpolation {
    /// Hold the key's value until the next key.
    Step,
    /// Linear over the normalized time fraction.
    #[default]
    Linear,
    /// Cubic Hermite using the key slopes.
    Cubic,
}

impl KeyInterpolation {
    /// All variant names, for attribute-type reporting.
    pub const VARIANTS: &'static [&'static str] = &["Step", "Linear", "Cubic"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            KeyInterpolation::Step => "Step",
            KeyInterpolation::Linear => "Linear",
            KeyInterpolation::Cubic => "Cubic",
        }
    }

    #[must_use]
    pub fn from_str(name: &str) -> Option<Self> {
        match name {
            "Step" => Some(KeyInterpolation::Step),
            "Linear" => Some(KeyInterpolation::Linear),
            "Cubic" => Some(KeyInterpolation::Cubic),
            _ => None,
        }
    }
}

/// A single control point of an [`AnimationSequence`]: a time in
/// milliseconds, a scalar value and interpolation metadata for the span to
/// the next key.
///
/// [`AnimationSequence`]: crate::animation::AnimationSequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationKey {
    /// Key time in milliseconds.
    pub time: f64,
    pub value: f64,
    #[serde(default)]
    pub interpolation: KeyInterpolation,
    /// Incoming slope (value per millisecond), used by Cubic spans ending
    /// at this key.
    #[serde(default)]
    pub slope_in: f64,
    /// Outgoing slope (value per millisecond), used by Cubic spans starting
    /// at this key.
    #[serde(default)]
    pub slope_out: f64,
}

impl AnimationKey {
    #[must_use]
    pub fn new(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            interpolation: KeyInterpolation::Linear,
            slope_in: 0.0,
            slope_out: 0.0,
        }
    }

    #[must_use]
    pub fn with_interpolation(mut self, interpolation: KeyInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    #[must_use]
    pub fn with_slopes(mut self, slope_in: f64, slope_out: f64) -> Self {
        self.slope_in = slope_in;
        self.slope_out = slope_out;
        self
    }
}

impl Mutable for AnimationKey {
    fn type_name(&self) -> &'static str {
        "AnimationKey"
    }

    fn collect_fields(&self, mutator: &mut Mutator) {
        mutator.insert("time", self.time);
        mutator.insert("value", self.value);
        mutator.insert("interpolation", self.interpolation.as_str());
        mutator.insert("slope_in", self.slope_in);
        mutator.insert("slope_out", self.slope_out);
    }

    fn apply_field(&mut self, name: &str, value: &MutatorValue) -> bool {
        match (name, value) {
            ("time", MutatorValue::Number(n)) => self.time = *n,
            ("value", MutatorValue::Number(n)) => self.value = *n,
            ("interpolation", MutatorValue::String(s)) => {
                let Some(mode) = KeyInterpolation::from_str(s) else {
                    return false;
                };
                self.interpolation = mode;
            }
            ("slope_in", MutatorValue::Number(n)) => self.slope_in = *n,
            ("slope_out", MutatorValue::Number(n)) => self.slope_out = *n,
            _ => return false,
        }
        true
    }

    fn mutator_attribute_types(&self, mutator: &Mutator) -> MutatorAttributeTypes {
        mutator
            .iter()
            .map(|(name, _)| {
                let ty = if name == "interpolation" {
                    AttributeType::Enum(KeyInterpolation::VARIANTS)
                } else {
                    AttributeType::Number
                };
                (name.to_string(), ty)
            })
            .collect()
    }
}
