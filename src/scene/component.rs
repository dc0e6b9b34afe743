use std::any::Any;

use crate::errors::Result;
use crate::mutate::{Mutable, Mutator};
use crate::scene::NodeKey;

/// An attachable behavior/data unit bound to exactly one node at a time.
///
/// Components back-reference their owning node through a non-owning
/// [`NodeKey`]; ownership of the component storage stays with the graph's
/// component arena, so no reference cycles can form. A component attached
/// to one node must be detached before it can be attached to another.
///
/// Expecting certain components (transform, animator) at most once per node
/// is a convention, not statically enforced.
pub trait Component: Mutable {
    /// Key of the owning node, if attached.
    fn node(&self) -> Option<NodeKey>;

    /// Managed by [`Graph`] during attach/detach; not for general use.
    ///
    /// [`Graph`]: crate::scene::Graph
    fn set_node(&mut self, node: Option<NodeKey>);

    /// Invoked after the component was attached to a node.
    fn on_added(&mut self, _node: NodeKey) {}

    /// Invoked after the component was detached from its node.
    fn on_removed(&mut self) {}

    /// Invoked when the owning node is detached from its parent, i.e. the
    /// node leaves the live part of the scene tree.
    fn on_node_detached(&mut self) {}

    /// Serializes the component's state into a payload value.
    ///
    /// Defaults to the mutator snapshot. Types whose full state is not
    /// reachable through the mutator (derived data, compact encodings)
    /// override this.
    fn serialize_payload(&self) -> serde_json::Value {
        self.get_mutator().to_json()
    }

    /// Reconstructs full internal state from a payload produced by
    /// [`serialize_payload`].
    ///
    /// Distinct from [`Mutable::mutate`] on purpose: deserialization may
    /// rebuild state the mutator deliberately hides, e.g. recompute derived
    /// data.
    ///
    /// [`serialize_payload`]: Component::serialize_payload
    fn deserialize_payload(&mut self, payload: &serde_json::Value) -> Result<()> {
        let mutator = Mutator::from_json(payload)?;
        self.mutate(&mutator);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
