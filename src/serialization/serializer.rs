//! Serialization entry points.
//!
//! ```plaintext
//!  object → (serialize)  → Serialization → (stringify) → String
//!  object ← (deserialize) ← Serialization ← (parse)     ← String
//! ```
//!
//! The objects themselves select what to write and how to rebuild their
//! state (`serialize_payload` / `deserialize_payload`); this module wraps
//! payloads in their type tag and recovers the concrete type through the
//! [`registry`](crate::serialization::registry).

use crate::errors::{ArborError, Result};
use crate::scene::Component;
use crate::serialization::registry;
use crate::serialization::resource::Resource;

/// A type-tagged document: one entry mapping the runtime type tag to the
/// object's payload. Field order is preserved.
pub type Serialization = serde_json::Map<String, serde_json::Value>;

/// Wraps a component's payload in its type tag.
#[must_use]
pub fn serialize_component(component: &dyn Component) -> Serialization {
    let mut serialization = Serialization::new();
    serialization.insert(component.type_name().to_string(), component.serialize_payload());
    serialization
}

/// Reconstructs a component from a tagged document.
///
/// An unknown tag fails with [`ArborError::UnknownType`]; a blank instance
/// of a placeholder type is never substituted.
pub fn deserialize_component(serialization: &Serialization) -> Result<Box<dyn Component>> {
    let (tag, payload) = serialization
        .iter()
        .next()
        .ok_or_else(|| ArborError::UnknownType(String::new()))?;
    let mut component = registry::create_component(tag)?;
    component.deserialize_payload(payload)?;
    Ok(component)
}

/// Wraps a resource's payload in its type tag.
#[must_use]
pub fn serialize_resource(resource: &dyn Resource) -> Serialization {
    let mut serialization = Serialization::new();
    serialization.insert(resource.type_name().to_string(), resource.serialize_payload());
    serialization
}

/// Reconstructs a resource from a tagged document.
pub fn deserialize_resource(serialization: &Serialization) -> Result<Box<dyn Resource>> {
    let (tag, payload) = serialization
        .iter()
        .next()
        .ok_or_else(|| ArborError::UnknownType(String::new()))?;
    let mut resource = registry::create_resource(tag)?;
    resource.deserialize_payload(payload)?;
    Ok(resource)
}

/// Formats a serialization as human-readable JSON.
pub fn stringify(serialization: &Serialization) -> Result<String> {
    Ok(serde_json::to_string_pretty(serialization)?)
}

/// Parses a JSON string into a [`Serialization`]. The result may be passed
/// to the deserialize functions above.
pub fn parse(json: &str) -> Result<Serialization> {
    Ok(serde_json::from_str(json)?)
}
