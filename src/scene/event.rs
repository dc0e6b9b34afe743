use crate::scene::{ComponentKey, NodeKey};

/// Typed lifecycle and mutation events of a [`Graph`].
///
/// Dispatch is an explicit queue rather than an untyped event bus: graph
/// operations push events, the host drains them once per frame.
///
/// [`Graph`]: crate::scene::Graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    /// A node was appended to a parent.
    ChildAppended { parent: NodeKey, child: NodeKey },
    /// A node was detached from its parent. Fired before the unlink, so
    /// handlers still see the old hierarchy.
    ChildRemoved { parent: NodeKey, child: NodeKey },
    /// A component was attached to a node.
    ComponentAdded { node: NodeKey, component: ComponentKey },
    /// A component was detached from its node.
    ComponentRemoved { node: NodeKey, component: ComponentKey },
    /// A component was changed through the mutator protocol. Fired once per
    /// mutate call, not per field.
    Mutated { component: ComponentKey },
    /// A named animation time-marker was crossed during playback.
    Timeline { node: NodeKey, name: String },
}

/// Drainable queue of [`GraphEvent`]s.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<GraphEvent>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GraphEvent) {
        self.events.push(event);
    }

    /// Takes all pending events, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pending events in dispatch order.
    #[must_use]
    pub fn pending(&self) -> &[GraphEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
