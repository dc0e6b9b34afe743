//! Hierarchical scene graph.
//!
//! Manages the scene tree and its attached behavior:
//! - [`Graph`]: arena owning all nodes and components
//! - [`Node`]: a vertex of the tree (hierarchy + cached world matrix)
//! - [`Transform`]: TRS component with local-matrix cache and dirty check
//! - [`Component`]: attachable behavior/data unit bound to one node
//! - [`Material`]: color-carrying surface component
//! - [`GraphEvent`]: typed lifecycle/mutation events, drained by the host

pub mod component;
pub mod event;
pub mod graph;
pub mod material;
pub mod node;
pub mod transform;

pub use component::Component;
pub use event::{EventQueue, GraphEvent};
pub use graph::Graph;
pub use material::{Color, Material};
pub use node::Node;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    /// Generational handle of a [`Node`] inside a [`Graph`].
    pub struct NodeKey;
    /// Generational handle of a [`Component`] inside a [`Graph`].
    pub struct ComponentKey;
}
