use glam::Affine3A;
use smallvec::SmallVec;

use crate::scene::{ComponentKey, NodeKey};

/// A vertex of the scene tree.
///
/// Keeps only the data traversed every frame: the hierarchy links, the keys
/// of attached components and the cached world matrix. Component data
/// itself lives in the graph's component arena; a node borrows its
/// components, it does not own their storage slots.
///
/// # Hierarchy
///
/// Nodes form a tree: at most one parent, an ordered list of children. A
/// node is *detached* while `parent` is `None` and *attached* otherwise;
/// the transitions fire [`GraphEvent::ChildAppended`] /
/// [`GraphEvent::ChildRemoved`].
///
/// [`GraphEvent::ChildAppended`]: crate::scene::GraphEvent::ChildAppended
/// [`GraphEvent::ChildRemoved`]: crate::scene::GraphEvent::ChildRemoved
#[derive(Debug)]
pub struct Node {
    /// Display name; not required to be unique.
    pub name: String,

    // === Hierarchy ===
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,

    // === Components ===
    pub(crate) components: SmallVec<[ComponentKey; 4]>,
    /// Cached key of the first attached Transform, for the hot path of the
    /// world-matrix pass.
    pub(crate) transform_key: Option<ComponentKey>,

    // === Derived spatial data ===
    pub(crate) world_matrix: Affine3A,
    /// Set when the hierarchy above this node changed and the cached world
    /// matrix must be recomposed regardless of the local dirty check.
    pub(crate) world_dirty: bool,
}

impl Node {
    /// Serialization type tag of nodes.
    pub const TYPE: &'static str = "Node";

    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            components: SmallVec::new(),
            transform_key: None,
            world_matrix: Affine3A::IDENTITY,
            world_dirty: true,
        }
    }

    /// Parent node handle, if attached.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Read-only slice of child handles, in append order.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Read-only slice of attached component keys, in attach order.
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[ComponentKey] {
        &self.components
    }

    /// The cached world transformation matrix.
    ///
    /// Composed as `parent.world_matrix x local_matrix` by the graph's
    /// world-matrix pass; valid once that pass has run after the latest
    /// transform or hierarchy change.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }
}
