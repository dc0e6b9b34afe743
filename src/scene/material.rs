use std::any::Any;

use crate::errors::{ArborError, Result};
use crate::mutate::{Mutable, Mutator, MutatorValue};
use crate::scene::{Component, NodeKey};

/// RGBA color, channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub(crate) fn collect(self, mutator: &mut Mutator) {
        mutator.insert("r", self.r);
        mutator.insert("g", self.g);
        mutator.insert("b", self.b);
        mutator.insert("a", self.a);
    }

    pub(crate) fn apply(&mut self, mutator: &Mutator) {
        if let Some(r) = mutator.number("r") {
            self.r = r as f32;
        }
        if let Some(g) = mutator.number("g") {
            self.g = g as f32;
        }
        if let Some(b) = mutator.number("b") {
            self.b = b as f32;
        }
        if let Some(a) = mutator.number("a") {
            self.a = a as f32;
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Surface component carrying a name and a primary color.
///
/// The renderer reads it; animation drives the color channels through the
/// mutator protocol.
#[derive(Debug, Clone, Default)]
pub struct Material {
    node: Option<NodeKey>,
    pub name: String,
    pub color: Color,
}

impl Material {
    /// Serialization type tag.
    pub const TYPE: &'static str = "Material";

    #[must_use]
    pub fn new(name: &str, color: Color) -> Self {
        Self {
            node: None,
            name: name.to_string(),
            color,
        }
    }
}

impl Mutable for Material {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn collect_fields(&self, mutator: &mut Mutator) {
        mutator.insert("name", self.name.as_str());
        let mut color = Mutator::new();
        self.color.collect(&mut color);
        mutator.insert("color", color);
    }

    fn apply_field(&mut self, name: &str, value: &MutatorValue) -> bool {
        match (name, value) {
            ("name", MutatorValue::String(s)) => self.name = s.clone(),
            ("color", MutatorValue::Nested(nested)) => self.color.apply(nested),
            _ => return false,
        }
        true
    }
}

impl Component for Material {
    fn node(&self) -> Option<NodeKey> {
        self.node
    }

    fn set_node(&mut self, node: Option<NodeKey>) {
        self.node = node;
    }

    /// Colors serialize as a 4-element JSON array for compactness, unlike
    /// the general object-shaped serialization.
    fn serialize_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "color": self.color.to_array(),
        })
    }

    fn deserialize_payload(&mut self, payload: &serde_json::Value) -> Result<()> {
        self.name = payload
            .get("name")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ArborError::MissingField {
                type_name: Self::TYPE.to_string(),
                field: "name".to_string(),
            })?
            .to_string();
        let channels: [f32; 4] = serde_json::from_value(
            payload
                .get("color")
                .cloned()
                .ok_or_else(|| ArborError::MissingField {
                    type_name: Self::TYPE.to_string(),
                    field: "color".to_string(),
                })?,
        )?;
        self.color = Color::new(channels[0], channels[1], channels[2], channels[3]);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
