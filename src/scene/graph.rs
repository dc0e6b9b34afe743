use glam::Affine3A;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::errors::{ArborError, Result};
use crate::mutate::Mutator;
use crate::scene::event::{EventQueue, GraphEvent};
use crate::scene::node::Node;
use crate::scene::transform::Transform;
use crate::scene::{Component, ComponentKey, NodeKey};
use crate::serialization::registry;
use crate::serialization::serializer::Serialization;

/// The scene graph: an arena owning all nodes and all components.
///
/// Nodes and components are addressed by generational keys. The graph is
/// exclusively owned and mutated by one thread; all mutation happens
/// synchronously inside the frame-tick handler. The host is responsible for
/// running [`crate::animation::system::update`] and then
/// [`update_world_matrices`] before the renderer reads world matrices.
///
/// [`update_world_matrices`]: Graph::update_world_matrices
pub struct Graph {
    pub(crate) nodes: SlotMap<NodeKey, Node>,
    pub(crate) components: SlotMap<ComponentKey, Box<dyn Component>>,
    events: EventQueue,
    /// Process-wide playback speed multiplier applied to animators that
    /// opt into it.
    time_scale: f64,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            components: SlotMap::with_key(),
            events: EventQueue::new(),
            time_scale: 1.0,
        }
    }

    // ========================================================================
    // Node lifecycle
    // ========================================================================

    /// Creates a new detached node.
    pub fn create_node(&mut self, name: &str) -> NodeKey {
        self.nodes.insert(Node::new(name))
    }

    #[must_use]
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    #[must_use]
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Appends `child` to `parent`'s list of children.
    ///
    /// Re-appending an existing child of `parent` is a no-op. A node that is
    /// attached to a *different* parent must be detached first
    /// ([`ArborError::NodeAttached`]). Appending `parent` itself or one of
    /// its ancestors is rejected with [`ArborError::CycleDetected`] and
    /// leaves the tree unchanged.
    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return Err(ArborError::NodeNotFound);
        }
        match self.nodes[child].parent {
            Some(p) if p == parent => return Ok(()),
            Some(_) => {
                return Err(ArborError::NodeAttached {
                    node: self.nodes[child].name.clone(),
                });
            }
            None => {}
        }

        // Walk up from the target parent; hitting the child means the child
        // is an ancestor and the append would close a cycle.
        let mut ancestor = Some(parent);
        while let Some(key) = ancestor {
            if key == child {
                return Err(ArborError::CycleDetected {
                    node: self.nodes[child].name.clone(),
                });
            }
            ancestor = self.nodes[key].parent;
        }

        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        self.mark_subtree_world_dirty(child);
        self.events.push(GraphEvent::ChildAppended { parent, child });
        Ok(())
    }

    /// Detaches `child` from `parent`. A no-op if `child` is not currently
    /// a child of `parent`.
    ///
    /// The [`GraphEvent::ChildRemoved`] event is queued before the unlink
    /// and the child's components are notified through
    /// [`Component::on_node_detached`]. The detached subtree stays alive in
    /// the arena and can be re-appended elsewhere.
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) {
        let is_child = self
            .nodes
            .get(child)
            .is_some_and(|n| n.parent == Some(parent));
        if !is_child {
            return;
        }

        self.events.push(GraphEvent::ChildRemoved { parent, child });

        if let Some(p) = self.nodes.get_mut(parent)
            && let Some(index) = p.children.iter().position(|&k| k == child)
        {
            p.children.remove(index);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = None;
        }
        self.mark_subtree_world_dirty(child);

        let component_keys: SmallVec<[ComponentKey; 4]> =
            self.nodes.get(child).map(|n| n.components.clone()).unwrap_or_default();
        for key in component_keys {
            if let Some(component) = self.components.get_mut(key) {
                component.on_node_detached();
            }
        }
    }

    /// Removes a node and its whole subtree from the arena, including all
    /// attached components.
    pub fn destroy_node(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        for child in node.children.clone() {
            self.destroy_node(child);
        }

        if let Some(parent) = self.nodes.get(key).and_then(|n| n.parent)
            && let Some(p) = self.nodes.get_mut(parent)
            && let Some(index) = p.children.iter().position(|&k| k == key)
        {
            p.children.remove(index);
        }

        let component_keys: SmallVec<[ComponentKey; 4]> =
            self.nodes.get(key).map(|n| n.components.clone()).unwrap_or_default();
        for ckey in component_keys {
            self.remove_component(ckey);
        }

        self.nodes.remove(key);
    }

    // ========================================================================
    // Lookup helpers
    // ========================================================================

    /// Direct children of `parent` carrying the given name.
    #[must_use]
    pub fn children_by_name(&self, parent: NodeKey, name: &str) -> Vec<NodeKey> {
        self.nodes
            .get(parent)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|&c| self.nodes.get(c).is_some_and(|n| n.name == name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Depth-first search for the first node named `name` in the subtree
    /// rooted at `root` (inclusive).
    #[must_use]
    pub fn find_by_name(&self, root: NodeKey, name: &str) -> Option<NodeKey> {
        let node = self.nodes.get(root)?;
        if node.name == name {
            return Some(root);
        }
        for &child in &node.children {
            if let Some(found) = self.find_by_name(child, name) {
                return Some(found);
            }
        }
        None
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Attaches a component to a node.
    ///
    /// Fails with [`ArborError::ComponentAttached`] if the component
    /// already belongs to a node; it must be removed there first.
    pub fn add_component(
        &mut self,
        node: NodeKey,
        mut component: Box<dyn Component>,
    ) -> Result<ComponentKey> {
        if !self.nodes.contains_key(node) {
            return Err(ArborError::NodeNotFound);
        }
        if component.node().is_some() {
            return Err(ArborError::ComponentAttached {
                type_name: component.type_name(),
            });
        }

        component.set_node(Some(node));
        let is_transform = component.as_any().is::<Transform>();
        let key = self.components.insert(component);

        let entry = &mut self.nodes[node];
        entry.components.push(key);
        if is_transform && entry.transform_key.is_none() {
            entry.transform_key = Some(key);
        }
        entry.world_dirty = true;

        self.components[key].on_added(node);
        self.events.push(GraphEvent::ComponentAdded { node, component: key });
        Ok(key)
    }

    /// Detaches and returns a component; `None` for a stale key.
    pub fn remove_component(&mut self, key: ComponentKey) -> Option<Box<dyn Component>> {
        let mut component = self.components.remove(key)?;
        let node = component.node();

        if let Some(node_key) = node
            && let Some(entry) = self.nodes.get_mut(node_key)
        {
            entry.components.retain(|&mut k| k != key);
            if entry.transform_key == Some(key) {
                entry.transform_key = None;
                entry.world_dirty = true;
                // Fall back to the next attached transform, if any.
                for &k in &entry.components {
                    if self.components.get(k).is_some_and(|c| c.as_any().is::<Transform>()) {
                        entry.transform_key = Some(k);
                        break;
                    }
                }
            }
        }

        component.set_node(None);
        component.on_removed();
        if let Some(node) = node {
            self.events.push(GraphEvent::ComponentRemoved { node, component: key });
        }
        Some(component)
    }

    /// First attached component of the concrete type `T`, or `None`.
    #[must_use]
    pub fn get_component<T: Component + 'static>(&self, node: NodeKey) -> Option<&T> {
        self.nodes.get(node)?.components.iter().find_map(|&key| {
            self.components
                .get(key)
                .and_then(|c| c.as_any().downcast_ref::<T>())
        })
    }

    /// Mutable access to the first attached component of type `T`.
    #[must_use]
    pub fn get_component_mut<T: Component + 'static>(&mut self, node: NodeKey) -> Option<&mut T> {
        let key = self.nodes.get(node)?.components.iter().copied().find(|&k| {
            self.components.get(k).is_some_and(|c| c.as_any().is::<T>())
        })?;
        self.components.get_mut(key)?.as_any_mut().downcast_mut::<T>()
    }

    /// Resolves a component key to a typed reference.
    #[must_use]
    pub fn component<T: Component + 'static>(&self, key: ComponentKey) -> Option<&T> {
        self.components.get(key)?.as_any().downcast_ref::<T>()
    }

    /// Resolves a component key to a typed mutable reference.
    #[must_use]
    pub fn component_mut<T: Component + 'static>(&mut self, key: ComponentKey) -> Option<&mut T> {
        self.components.get_mut(key)?.as_any_mut().downcast_mut::<T>()
    }

    /// All components of type `T` together with their owning nodes, in
    /// arena order.
    #[must_use]
    pub fn components_of_type<T: Component + 'static>(&self) -> Vec<(ComponentKey, NodeKey)> {
        self.components
            .iter()
            .filter(|(_, c)| c.as_any().is::<T>())
            .filter_map(|(key, c)| c.node().map(|node| (key, node)))
            .collect()
    }

    /// Shortcut to a node's transform component.
    #[must_use]
    pub fn transform(&self, node: NodeKey) -> Option<&Transform> {
        let key = self.nodes.get(node)?.transform_key?;
        self.component::<Transform>(key)
    }

    /// Mutable shortcut to a node's transform component.
    #[must_use]
    pub fn transform_mut(&mut self, node: NodeKey) -> Option<&mut Transform> {
        let key = self.nodes.get(node)?.transform_key?;
        self.component_mut::<Transform>(key)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Applies a mutator to a component and queues the single `Mutated`
    /// notification. Returns `false` for a stale key.
    pub fn mutate_component(&mut self, key: ComponentKey, mutator: &Mutator) -> bool {
        let Some(component) = self.components.get_mut(key) else {
            return false;
        };
        component.mutate(mutator);
        self.events.push(GraphEvent::Mutated { component: key });
        true
    }

    /// Applies an animation mutator to a node's component tree.
    ///
    /// Top-level keys name component types; each nested mutator is applied
    /// to the first component of that type on the node. The reserved key
    /// `children` nests child-name to node-mutator recursion. Keys with no
    /// live target are dropped permissively and reported once as a single
    /// batched warning.
    pub fn apply_animation(&mut self, node: NodeKey, mutator: &Mutator) {
        let mut dropped: Vec<String> = Vec::new();
        self.apply_animation_inner(node, mutator, &mut dropped);
        if !dropped.is_empty() {
            log::warn!("apply_animation: no target for keys {dropped:?}");
        }
    }

    fn apply_animation_inner(&mut self, node: NodeKey, mutator: &Mutator, dropped: &mut Vec<String>) {
        for (name, value) in mutator.iter() {
            let Some(nested) = value.as_nested() else {
                dropped.push(name.to_string());
                continue;
            };

            if name == "children" {
                for (child_name, child_value) in nested.iter() {
                    let Some(child_mutator) = child_value.as_nested() else {
                        continue;
                    };
                    match self.children_by_name(node, child_name).first().copied() {
                        Some(child) => {
                            self.apply_animation_inner(child, child_mutator, dropped);
                        }
                        None => dropped.push(format!("children.{child_name}")),
                    }
                }
                continue;
            }

            let target = self.nodes.get(node).and_then(|n| {
                n.components.iter().copied().find(|&key| {
                    self.components.get(key).is_some_and(|c| c.type_name() == name)
                })
            });
            match target {
                Some(key) => {
                    self.mutate_component(key, nested);
                }
                None => dropped.push(name.to_string()),
            }
        }
    }

    // ========================================================================
    // World matrices
    // ========================================================================

    /// Recomputes cached world matrices for every node whose local
    /// transform or ancestry changed since the last pass.
    ///
    /// Explicit-stack traversal, so deep hierarchies cannot overflow the
    /// call stack. Must run after animation updates and before the renderer
    /// reads matrices.
    pub fn update_world_matrices(&mut self) {
        let roots: Vec<NodeKey> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(k, _)| k)
            .collect();

        let mut stack: Vec<(NodeKey, Affine3A, bool)> = Vec::with_capacity(64);
        for &root in roots.iter().rev() {
            stack.push((root, Affine3A::IDENTITY, false));
        }

        while let Some((key, parent_world, parent_changed)) = stack.pop() {
            let (local_changed, local) = match self.nodes.get(key).and_then(|n| n.transform_key) {
                Some(tkey) => match self.component_mut::<Transform>(tkey) {
                    Some(transform) => (transform.update_local_matrix(), *transform.local_matrix()),
                    None => (false, Affine3A::IDENTITY),
                },
                None => (false, Affine3A::IDENTITY),
            };

            let Some(node) = self.nodes.get_mut(key) else {
                continue;
            };
            let needs_update = local_changed || parent_changed || node.world_dirty;
            if needs_update {
                node.world_matrix = parent_world * local;
                node.world_dirty = false;
            }
            let world = node.world_matrix;

            let children = node.children.clone();
            for &child in children.iter().rev() {
                stack.push((child, world, needs_update));
            }
        }
    }

    /// Cached world matrix of a node. Valid once
    /// [`update_world_matrices`](Graph::update_world_matrices) has run
    /// after the latest change.
    #[must_use]
    pub fn world_matrix(&self, node: NodeKey) -> Option<&Affine3A> {
        self.nodes.get(node).map(Node::world_matrix)
    }

    fn mark_subtree_world_dirty(&mut self, root: NodeKey) {
        let mut stack = vec![root];
        while let Some(key) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(key) {
                node.world_dirty = true;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    // ========================================================================
    // Events & time scale
    // ========================================================================

    /// Pending events, in dispatch order.
    #[must_use]
    pub fn events(&self) -> &[GraphEvent] {
        self.events.pending()
    }

    /// Drains all pending events.
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        self.events.drain()
    }

    pub(crate) fn push_event(&mut self, event: GraphEvent) {
        self.events.push(event);
    }

    /// Process-wide playback speed multiplier (default 1.0).
    #[must_use]
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Sets the playback speed multiplier. Animators that scale with global
    /// speed pick the change up on their next tick without a time jump.
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale;
    }

    // ========================================================================
    // Serialization of subtrees
    // ========================================================================

    /// Serializes the subtree rooted at `root` into a type-tagged document.
    pub fn serialize_node(&self, root: NodeKey) -> Result<Serialization> {
        let node = self.nodes.get(root).ok_or(ArborError::NodeNotFound)?;

        let mut components = serde_json::Map::new();
        for &key in &node.components {
            let Some(component) = self.components.get(key) else {
                continue;
            };
            let list = components
                .entry(component.type_name().to_string())
                .or_insert_with(|| serde_json::Value::Array(Vec::new()));
            if let serde_json::Value::Array(list) = list {
                list.push(component.serialize_payload());
            }
        }

        let mut children = Vec::with_capacity(node.children.len());
        for &child in &node.children {
            children.push(serde_json::Value::Object(self.serialize_node(child)?));
        }

        let mut payload = serde_json::Map::new();
        payload.insert("name".to_string(), serde_json::Value::String(node.name.clone()));
        payload.insert("components".to_string(), serde_json::Value::Object(components));
        payload.insert("children".to_string(), serde_json::Value::Array(children));

        let mut serialization = Serialization::new();
        serialization.insert(Node::TYPE.to_string(), serde_json::Value::Object(payload));
        Ok(serialization)
    }

    /// Reconstructs a subtree from a document produced by
    /// [`serialize_node`](Graph::serialize_node); returns the new detached
    /// root.
    ///
    /// Component types are instantiated through the process-wide registry;
    /// an unknown tag fails with [`ArborError::UnknownType`]. On any error
    /// the partially built subtree is destroyed again, so no partial state
    /// is committed.
    pub fn deserialize_node(&mut self, serialization: &Serialization) -> Result<NodeKey> {
        let (tag, payload) = serialization
            .iter()
            .next()
            .ok_or_else(|| ArborError::UnknownType(String::new()))?;
        if tag != Node::TYPE {
            return Err(ArborError::UnknownType(tag.clone()));
        }

        let name = payload
            .get("name")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ArborError::MissingField {
                type_name: Node::TYPE.to_string(),
                field: "name".to_string(),
            })?;
        let key = self.create_node(name);

        match self.populate_node(key, payload) {
            Ok(()) => Ok(key),
            Err(error) => {
                self.destroy_node(key);
                Err(error)
            }
        }
    }

    fn populate_node(&mut self, key: NodeKey, payload: &serde_json::Value) -> Result<()> {
        if let Some(components) = payload.get("components").and_then(serde_json::Value::as_object) {
            for (type_name, list) in components {
                let Some(list) = list.as_array() else {
                    continue;
                };
                for item in list {
                    let mut component = registry::create_component(type_name)?;
                    component.deserialize_payload(item)?;
                    self.add_component(key, component)?;
                }
            }
        }

        if let Some(children) = payload.get("children").and_then(serde_json::Value::as_array) {
            for child in children {
                let Some(child_serialization) = child.as_object() else {
                    continue;
                };
                // A failing child cleans up after itself before propagating.
                let child_key = self.deserialize_node(child_serialization)?;
                self.append_child(key, child_key)?;
            }
        }

        Ok(())
    }
}
