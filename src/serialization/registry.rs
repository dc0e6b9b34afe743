//! Process-wide type registry.
//!
//! Maps stable type tags to factory functions so deserialization can
//! instantiate the correct concrete type without the caller knowing it
//! upfront. Populated once at process start, read many times, never
//! cleared during normal operation; [`clear`] exists as an explicit reset
//! hook for test harnesses.

use std::sync::LazyLock;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::animation::{Animation, Animator};
use crate::errors::{ArborError, Result};
use crate::scene::{Component, Material, Transform};
use crate::serialization::Resource;

/// Creates a blank component instance for deserialization to fill.
pub type ComponentFactory = fn() -> Box<dyn Component>;
/// Creates a blank resource instance for deserialization to fill.
pub type ResourceFactory = fn() -> Box<dyn Resource>;

#[derive(Default)]
struct TypeRegistry {
    components: FxHashMap<&'static str, ComponentFactory>,
    resources: FxHashMap<&'static str, ResourceFactory>,
}

static REGISTRY: LazyLock<RwLock<TypeRegistry>> =
    LazyLock::new(|| RwLock::new(TypeRegistry::default()));

/// Registers a component type under its stable tag. Re-registering a tag
/// replaces the factory, so registration is idempotent.
pub fn register_component(name: &'static str, factory: ComponentFactory) {
    REGISTRY.write().components.insert(name, factory);
}

/// Registers a resource type under its stable tag.
pub fn register_resource(name: &'static str, factory: ResourceFactory) {
    REGISTRY.write().resources.insert(name, factory);
}

/// Registers every built-in component and resource type. Call once at
/// process start, before any deserialization; calling again is harmless.
pub fn register_builtins() {
    register_component(Transform::TYPE, || Box::new(Transform::new()));
    register_component(Material::TYPE, || Box::new(Material::default()));
    register_component(Animator::TYPE, || Box::new(Animator::default()));
    register_resource(Animation::TYPE, || Box::new(Animation::default()));
}

/// Instantiates a blank component for the given tag.
pub fn create_component(name: &str) -> Result<Box<dyn Component>> {
    REGISTRY.read().components.get(name).map(|f| f()).ok_or_else(|| {
        log::error!("unknown component type tag \"{name}\"");
        ArborError::UnknownType(name.to_string())
    })
}

/// Instantiates a blank resource for the given tag.
pub fn create_resource(name: &str) -> Result<Box<dyn Resource>> {
    REGISTRY.read().resources.get(name).map(|f| f()).ok_or_else(|| {
        log::error!("unknown resource type tag \"{name}\"");
        ArborError::UnknownType(name.to_string())
    })
}

/// True if a component type is registered under the tag.
#[must_use]
pub fn has_component(name: &str) -> bool {
    REGISTRY.read().components.contains_key(name)
}

/// True if a resource type is registered under the tag.
#[must_use]
pub fn has_resource(name: &str) -> bool {
    REGISTRY.read().resources.contains_key(name)
}

/// Empties the registry. Test-harness reset hook; never called during
/// normal operation.
pub fn clear() {
    let mut registry = REGISTRY.write();
    registry.components.clear();
    registry.resources.clear();
}
