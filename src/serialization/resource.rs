use std::any::Any;

use crate::errors::Result;
use crate::mutate::Mutable;

/// A shareable, registrable object: referenced from many places, stored
/// once in a [`Project`] under a generated id.
///
/// Like components, resources serialize into a type-tagged payload and
/// reconstruct full internal state in [`deserialize_payload`] — including
/// derived state the mutator deliberately hides.
///
/// [`Project`]: crate::serialization::Project
/// [`deserialize_payload`]: Resource::deserialize_payload
pub trait Resource: Mutable {
    /// Display name; not unique.
    fn name(&self) -> &str;

    /// Project-assigned id, once registered.
    fn id(&self) -> Option<&str>;

    /// Managed by [`Project`] during registration.
    ///
    /// [`Project`]: crate::serialization::Project
    fn set_id(&mut self, id: Option<String>);

    /// Serializes the resource's state into a payload value.
    fn serialize_payload(&self) -> serde_json::Value;

    /// Reconstructs full internal state from a payload produced by
    /// [`serialize_payload`](Resource::serialize_payload).
    fn deserialize_payload(&mut self, payload: &serde_json::Value) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
