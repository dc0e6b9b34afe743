//! Animation update system.
//!
//! Drives every [`Animator`] in a graph from the external frame clock.
//! Within one tick, all animators sample and apply before the host updates
//! world matrices and renders; the host is responsible for calling
//! [`update`] first in its frame handler — the core does not schedule
//! handlers itself.

use crate::animation::animator::Animator;
use crate::scene::{Component, ComponentKey, Graph, GraphEvent};
use crate::time::FrameTick;

/// Advances all animators by one frame tick and applies their sampled
/// mutators to their owning nodes.
///
/// Timeline events crossed during the tick are pushed to the graph's event
/// queue as [`GraphEvent::Timeline`], in trigger-time order per animator.
/// The first tick after an animator activates only anchors its clock.
pub fn update(graph: &mut Graph, tick: FrameTick) {
    let animators = graph.components_of_type::<Animator>();
    let global_scale = graph.time_scale();

    for (key, node) in animators {
        let result = match graph.component_mut::<Animator>(key) {
            Some(animator) => {
                animator.sync_rate(global_scale);
                animator.advance(&tick)
            }
            None => None,
        };
        let Some(sampled) = result else {
            continue;
        };

        if let Some(mutator) = sampled.mutator {
            graph.apply_animation(node, &mutator);
        }
        for name in sampled.events {
            graph.push_event(GraphEvent::Timeline { node, name });
        }
    }
}

/// Jumps one animator to a local time and applies the sample immediately,
/// outside the regular tick. Used by editor scrubbing.
pub fn jump_to(graph: &mut Graph, animator: ComponentKey, time: f64) {
    let target = graph.component::<Animator>(animator).and_then(|a| a.node());
    let Some(node) = target else {
        return;
    };
    let mutator = graph
        .component_mut::<Animator>(animator)
        .and_then(|a| a.jump_to(time));
    if let Some(mutator) = mutator {
        graph.apply_animation(node, &mutator);
    }
}
