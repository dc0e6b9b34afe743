//! Type-tagged serialization.
//!
//! A [`Serialization`] is a transport-neutral nested map keyed by a runtime
//! type tag wrapping the object's payload, so the concrete type can be
//! recovered without an external schema. Components and resources
//! self-register in the process-wide [`registry`] at startup
//! ([`registry::register_builtins`]); the [`Project`] keeps the registered
//! resources of a session and serializes them as one document keyed by
//! generated resource ids.

pub mod project;
pub mod registry;
pub mod resource;
pub mod serializer;

pub use project::{FsLoader, Project, ResourceLoader};
pub use resource::Resource;
pub use serializer::{
    Serialization, deserialize_component, deserialize_resource, parse, serialize_component,
    serialize_resource, stringify,
};
