//! Playback Controller Tests
//!
//! Tests for:
//! - Playmode directions (ping-pong alternation, reverse, play-once)
//! - Loop folding of the local time into the animation length
//! - Playback precision modes, incl. frame-based determinism
//! - Speed scaling (local and global) without time discontinuities
//! - Timeline event dispatch through the graph's event queue

use arbor::animation::{
    Animation, AnimationKey, AnimationSequence, AnimationStructure, Animator, Playback, Playmode,
    system,
};
use arbor::scene::{Graph, GraphEvent, NodeKey, Transform};
use arbor::time::FrameTick;

const EPSILON: f32 = 1e-3;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Animation driving `Transform.translation.x` from 0 to 10 over `total` ms.
fn ramp_animation(total: f64, fps: f64) -> Animation {
    let mut structure = AnimationStructure::new();
    structure.set_sequence(
        "Transform.translation.x",
        AnimationSequence::from_keys([AnimationKey::new(0.0, 0.0), AnimationKey::new(total, 10.0)]),
    );
    Animation::new("ramp", structure, fps)
}

fn rigged_graph(animation: Animation, playmode: Playmode, playback: Playback) -> (Graph, NodeKey) {
    let mut graph = Graph::new();
    let node = graph.create_node("node");
    graph.add_component(node, Box::new(Transform::new())).unwrap();
    graph
        .add_component(node, Box::new(Animator::new(animation, playmode, playback)))
        .unwrap();
    (graph, node)
}

fn x_of(graph: &Graph, node: NodeKey) -> f32 {
    graph.transform(node).unwrap().translation.x
}

fn timeline_names(graph: &mut Graph) -> Vec<String> {
    graph
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            GraphEvent::Timeline { name, .. } => Some(name),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Playmode directions
// ============================================================================

#[test]
fn pingpong_direction_alternates_per_period() {
    assert!((Playmode::PingPong.direction(500.0, 1000.0) - 1.0).abs() < f64::EPSILON);
    assert!((Playmode::PingPong.direction(1500.0, 1000.0) + 1.0).abs() < f64::EPSILON);
    assert!((Playmode::PingPong.direction(2500.0, 1000.0) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn directions_per_playmode() {
    assert!((Playmode::Loop.direction(123.0, 1000.0) - 1.0).abs() < f64::EPSILON);
    assert!((Playmode::ReverseLoop.direction(123.0, 1000.0) + 1.0).abs() < f64::EPSILON);
    assert!(Playmode::Stop.direction(123.0, 1000.0).abs() < f64::EPSILON);
    assert!((Playmode::PlayOnce.direction(999.0, 1000.0) - 1.0).abs() < f64::EPSILON);
    assert!(Playmode::PlayOnce.direction(1001.0, 1000.0).abs() < f64::EPSILON);
}

// ============================================================================
// Loop folding
// ============================================================================

#[test]
fn loop_folds_local_time_into_animation_length() {
    // total 2000, sampled at local time 3000: folds to 1000, direction +1, x = 5.
    let (mut graph, node) = rigged_graph(ramp_animation(2000.0, 60.0), Playmode::Loop, Playback::Continuous);

    system::update(&mut graph, FrameTick::new(0.0));
    system::update(&mut graph, FrameTick::new(3000.0));

    assert!(approx(x_of(&graph, node), 5.0));

    let animator = graph.get_component::<Animator>(node).unwrap();
    assert!((animator.last_direction() - 1.0).abs() < f64::EPSILON);
    assert!((animator.last_time() - 3000.0).abs() < f64::EPSILON);
}

#[test]
fn reverse_loop_mirrors_the_sample_time() {
    let (mut graph, node) = rigged_graph(ramp_animation(1000.0, 60.0), Playmode::ReverseLoop, Playback::Continuous);

    system::update(&mut graph, FrameTick::new(0.0));
    system::update(&mut graph, FrameTick::new(250.0));

    // folded = 1000 - 250 = 750
    assert!(approx(x_of(&graph, node), 7.5));
}

#[test]
fn play_once_freezes_on_last_frame() {
    let (mut graph, node) = rigged_graph(ramp_animation(1000.0, 60.0), Playmode::PlayOnce, Playback::Continuous);

    system::update(&mut graph, FrameTick::new(0.0));
    system::update(&mut graph, FrameTick::new(1500.0));
    assert!(approx(x_of(&graph, node), 10.0));

    // Further ticks change nothing.
    system::update(&mut graph, FrameTick::new(3000.0));
    assert!(approx(x_of(&graph, node), 10.0));
}

#[test]
fn play_once_stop_after_returns_to_first_frame() {
    let (mut graph, node) = rigged_graph(
        ramp_animation(1000.0, 60.0),
        Playmode::PlayOnceStopAfter,
        Playback::Continuous,
    );

    system::update(&mut graph, FrameTick::new(0.0));
    system::update(&mut graph, FrameTick::new(1500.0));
    assert!(approx(x_of(&graph, node), 0.0));
}

#[test]
fn stop_neither_samples_nor_fires() {
    let mut animation = ramp_animation(1000.0, 60.0);
    animation.set_event("tick", 500.0);
    let (mut graph, node) = rigged_graph(animation, Playmode::Stop, Playback::Continuous);

    system::update(&mut graph, FrameTick::new(0.0));
    system::update(&mut graph, FrameTick::new(800.0));

    assert!(approx(x_of(&graph, node), 0.0));
    assert!(timeline_names(&mut graph).is_empty());
}

// ============================================================================
// Playback precision
// ============================================================================

#[test]
fn rastered_playback_steps_on_the_frame_grid() {
    // 10 fps: 100 ms raster.
    let (mut graph, node) = rigged_graph(ramp_animation(1000.0, 10.0), Playmode::Loop, Playback::RasteredFps);

    system::update(&mut graph, FrameTick::new(0.0));
    system::update(&mut graph, FrameTick::new(250.0));
    assert!(approx(x_of(&graph, node), 2.0), "250 ms truncates to the 200 ms frame");

    let (mut continuous, cnode) =
        rigged_graph(ramp_animation(1000.0, 10.0), Playmode::Loop, Playback::Continuous);
    system::update(&mut continuous, FrameTick::new(0.0));
    system::update(&mut continuous, FrameTick::new(250.0));
    assert!(approx(x_of(&continuous, cnode), 2.5));
}

#[test]
fn frame_based_playback_ignores_wall_clock_gaps() {
    // 10 fps: every tick advances exactly 100 ms of animation time.
    let mut animation = ramp_animation(1000.0, 10.0);
    animation.set_event("boom", 250.0);

    let (mut jittery, node_a) = rigged_graph(animation.clone(), Playmode::Loop, Playback::FrameBased);
    let (mut steady, node_b) = rigged_graph(animation, Playmode::Loop, Playback::FrameBased);

    // Identical tick counts, wildly different wall-clock gaps.
    for t in [0.0, 7.0, 13.0, 200.0, 205.0] {
        system::update(&mut jittery, FrameTick::new(t));
    }
    for t in [0.0, 1000.0, 2000.0, 3000.0, 4000.0] {
        system::update(&mut steady, FrameTick::new(t));
    }

    let x_a = x_of(&jittery, node_a);
    let x_b = x_of(&steady, node_b);
    assert!(approx(x_a, x_b), "frame-based playback must be deterministic: {x_a} vs {x_b}");
    assert!(approx(x_a, 5.0), "5 ticks x 100 ms = 500 ms into the ramp");

    assert_eq!(timeline_names(&mut jittery), timeline_names(&mut steady));
}

// ============================================================================
// Speed scaling
// ============================================================================

#[test]
fn local_speed_scales_the_clock_rate() {
    let (mut graph, node) = rigged_graph(ramp_animation(2000.0, 60.0), Playmode::Loop, Playback::Continuous);
    graph
        .get_component_mut::<Animator>(node)
        .unwrap()
        .set_speed(2.0);

    system::update(&mut graph, FrameTick::new(0.0));
    system::update(&mut graph, FrameTick::new(500.0));

    // 500 ms wall time at double speed: local 1000 ms, x = 5.
    assert!(approx(x_of(&graph, node), 5.0));
}

#[test]
fn global_time_scale_multiplies_in() {
    let (mut graph, node) = rigged_graph(ramp_animation(2000.0, 60.0), Playmode::Loop, Playback::Continuous);
    graph
        .get_component_mut::<Animator>(node)
        .unwrap()
        .set_speed(2.0);
    graph.set_time_scale(0.5);

    system::update(&mut graph, FrameTick::new(0.0));
    system::update(&mut graph, FrameTick::new(500.0));

    // Effective rate 2.0 x 0.5 = 1.0: local 500 ms, x = 2.5.
    assert!(approx(x_of(&graph, node), 2.5));
}

#[test]
fn opting_out_of_global_scale() {
    let (mut graph, node) = rigged_graph(ramp_animation(2000.0, 60.0), Playmode::Loop, Playback::Continuous);
    {
        let animator = graph.get_component_mut::<Animator>(node).unwrap();
        animator.set_speed(2.0);
        animator.scale_with_global = false;
    }
    graph.set_time_scale(0.5);

    system::update(&mut graph, FrameTick::new(0.0));
    system::update(&mut graph, FrameTick::new(500.0));

    assert!(approx(x_of(&graph, node), 5.0));
}

// ============================================================================
// Timeline events through the graph
// ============================================================================

#[test]
fn events_dispatch_once_per_crossing() {
    let mut animation = ramp_animation(2000.0, 60.0);
    animation.set_event("boom", 1900.0);
    let (mut graph, node) = rigged_graph(animation, Playmode::Loop, Playback::Continuous);

    system::update(&mut graph, FrameTick::new(0.0));
    system::update(&mut graph, FrameTick::new(1800.0));
    assert!(timeline_names(&mut graph).is_empty());

    system::update(&mut graph, FrameTick::new(2200.0));
    let names = timeline_names(&mut graph);
    assert_eq!(names, vec!["boom".to_string()]);

    // The event carries the owning node.
    system::update(&mut graph, FrameTick::new(4100.0));
    let events = graph.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        GraphEvent::Timeline { node: n, name } if *n == node && name == "boom"
    )));
}

// ============================================================================
// Lifecycle & edge cases
// ============================================================================

#[test]
fn detaching_the_node_deactivates_the_animator() {
    let mut graph = Graph::new();
    let root = graph.create_node("root");
    let limb = graph.create_node("limb");
    graph.append_child(root, limb).unwrap();
    graph.add_component(limb, Box::new(Transform::new())).unwrap();
    graph
        .add_component(
            limb,
            Box::new(Animator::new(
                ramp_animation(1000.0, 60.0),
                Playmode::Loop,
                Playback::Continuous,
            )),
        )
        .unwrap();
    assert!(graph.get_component::<Animator>(limb).unwrap().is_active());

    graph.remove_child(root, limb);
    assert!(!graph.get_component::<Animator>(limb).unwrap().is_active());

    system::update(&mut graph, FrameTick::new(0.0));
    system::update(&mut graph, FrameTick::new(500.0));
    assert!(approx(x_of(&graph, limb), 0.0), "inactive controller must not sample");
}

#[test]
fn empty_animation_is_inert() {
    let empty = Animation::new("empty", AnimationStructure::new(), 60.0);
    let (mut graph, node) = rigged_graph(empty, Playmode::Loop, Playback::Continuous);

    system::update(&mut graph, FrameTick::new(0.0));
    system::update(&mut graph, FrameTick::new(1000.0));

    assert!(approx(x_of(&graph, node), 0.0));
    assert!(timeline_names(&mut graph).is_empty());
}

#[test]
fn jump_to_applies_immediately() {
    let (mut graph, node) = rigged_graph(ramp_animation(2000.0, 60.0), Playmode::Loop, Playback::Continuous);
    let animator_key = graph.components_of_type::<Animator>()[0].0;

    system::jump_to(&mut graph, animator_key, 1000.0);

    assert!(approx(x_of(&graph, node), 5.0));
    let animator = graph.get_component::<Animator>(node).unwrap();
    assert!((animator.current_time() - 1000.0).abs() < 1e-6);
}
