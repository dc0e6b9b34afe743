//! Animation Data Tests
//!
//! Tests for:
//! - AnimationSequence evaluate: clamping, linear/step/cubic spans
//! - Key insertion order, duplicate-time replacement, modify/remove
//! - AnimationStructure path building and mutator-shaped sampling
//! - Animation total-time recompute, raster sampling and event crossings
//! - Resource payload round trips

use arbor::animation::{
    Animation, AnimationKey, AnimationSequence, AnimationStructure, KeyInterpolation, Playback,
};
use arbor::serialization::Resource;

const EPSILON: f64 = 1e-5;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn ramp() -> AnimationSequence {
    AnimationSequence::from_keys([AnimationKey::new(0.0, 0.0), AnimationKey::new(1000.0, 10.0)])
}

// ============================================================================
// Sequence: evaluate
// ============================================================================

#[test]
fn evaluate_clamps_and_interpolates() {
    let sequence = ramp();
    assert!(approx(sequence.evaluate(-500.0), 0.0), "before first key: clamp");
    assert!(approx(sequence.evaluate(1500.0), 10.0), "after last key: clamp");
    assert!(approx(sequence.evaluate(500.0), 5.0), "linear midpoint");
}

#[test]
fn evaluate_at_exact_keyframes() {
    let sequence = AnimationSequence::from_keys([
        AnimationKey::new(0.0, 0.0),
        AnimationKey::new(1000.0, 10.0),
        AnimationKey::new(2000.0, 20.0),
    ]);
    assert!(approx(sequence.evaluate(0.0), 0.0));
    assert!(approx(sequence.evaluate(1000.0), 10.0));
    assert!(approx(sequence.evaluate(2000.0), 20.0));
}

#[test]
fn evaluate_step_holds_value() {
    let sequence = AnimationSequence::from_keys([
        AnimationKey::new(0.0, 0.0).with_interpolation(KeyInterpolation::Step),
        AnimationKey::new(1000.0, 100.0).with_interpolation(KeyInterpolation::Step),
    ]);
    assert!(approx(sequence.evaluate(500.0), 0.0));
    assert!(approx(sequence.evaluate(999.0), 0.0));
    assert!(approx(sequence.evaluate(1000.0), 100.0));
}

#[test]
fn evaluate_cubic_hits_endpoints_and_eases() {
    let sequence = AnimationSequence::from_keys([
        AnimationKey::new(0.0, 0.0).with_interpolation(KeyInterpolation::Cubic),
        AnimationKey::new(1000.0, 10.0).with_interpolation(KeyInterpolation::Cubic),
    ]);
    assert!(approx(sequence.evaluate(0.0), 0.0));
    assert!(approx(sequence.evaluate(1000.0), 10.0));
    // Zero slopes: Hermite midpoint equals the linear midpoint.
    assert!(approx(sequence.evaluate(500.0), 5.0));
    // But the quarter point eases in below the linear value.
    assert!(sequence.evaluate(250.0) < 2.5);
}

#[test]
fn evaluate_empty_sequence_is_zero() {
    let sequence = AnimationSequence::new();
    assert!(approx(sequence.evaluate(123.0), 0.0));
}

#[test]
fn evaluate_single_key_is_constant() {
    let sequence = AnimationSequence::from_keys([AnimationKey::new(500.0, 42.0)]);
    assert!(approx(sequence.evaluate(0.0), 42.0));
    assert!(approx(sequence.evaluate(500.0), 42.0));
    assert!(approx(sequence.evaluate(5000.0), 42.0));
}

// ============================================================================
// Sequence: key management
// ============================================================================

#[test]
fn add_key_keeps_ascending_order() {
    let mut sequence = AnimationSequence::new();
    sequence.add_key(AnimationKey::new(1000.0, 1.0));
    sequence.add_key(AnimationKey::new(0.0, 0.0));
    sequence.add_key(AnimationKey::new(500.0, 0.5));

    let times: Vec<f64> = sequence.keys().iter().map(|k| k.time).collect();
    assert_eq!(times, vec![0.0, 500.0, 1000.0]);
}

#[test]
fn duplicate_time_replaces_existing_key() {
    let mut sequence = ramp();
    sequence.add_key(AnimationKey::new(1000.0, 99.0));

    assert_eq!(sequence.len(), 2, "duplicate times never coexist");
    assert!(approx(sequence.find_key(1000.0).unwrap().value, 99.0), "last write wins");
}

#[test]
fn find_key_is_exact_time_only() {
    let sequence = ramp();
    assert!(sequence.find_key(0.0).is_some());
    assert!(sequence.find_key(0.5).is_none());
}

#[test]
fn modify_key_resorts_on_time_change() {
    let mut sequence = AnimationSequence::from_keys([
        AnimationKey::new(0.0, 0.0),
        AnimationKey::new(500.0, 5.0),
        AnimationKey::new(1000.0, 10.0),
    ]);

    // Move the middle key past the end.
    assert!(sequence.modify_key(1, Some(2000.0), Some(20.0)));

    let times: Vec<f64> = sequence.keys().iter().map(|k| k.time).collect();
    assert_eq!(times, vec![0.0, 1000.0, 2000.0]);
    assert!(approx(sequence.find_key(2000.0).unwrap().value, 20.0));

    assert!(!sequence.modify_key(10, None, None), "out of range index");
}

#[test]
fn remove_key_at_index() {
    let mut sequence = ramp();
    let removed = sequence.remove_key_at(0).unwrap();
    assert!(approx(removed.time, 0.0));
    assert_eq!(sequence.len(), 1);
    assert!(sequence.remove_key_at(5).is_none());
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn structure_sample_mirrors_shape() {
    let mut structure = AnimationStructure::new();
    structure.set_sequence("Transform.translation.x", ramp());
    structure.set_sequence("Transform.translation.y", AnimationSequence::from_keys([
        AnimationKey::new(0.0, 1.0),
    ]));

    let mutator = structure.sample(500.0);
    let transform = mutator.nested("Transform").expect("Transform branch");
    let translation = transform.nested("translation").expect("translation branch");
    assert!(approx(translation.number("x").unwrap(), 5.0));
    assert!(approx(translation.number("y").unwrap(), 1.0));
}

#[test]
fn structure_path_lookup() {
    let mut structure = AnimationStructure::new();
    structure.set_sequence("Transform.translation.x", ramp());

    assert!(structure.sequence_at("Transform.translation.x").is_some());
    assert!(structure.sequence_at("Transform.translation.z").is_none());
    assert!(structure.sequence_at("Transform").is_none(), "branch is not a leaf");
}

#[test]
fn structure_end_time_is_max_over_leaves() {
    let mut structure = AnimationStructure::new();
    structure.set_sequence("a.x", ramp());
    structure.set_sequence("b", AnimationSequence::from_keys([AnimationKey::new(3000.0, 1.0)]));
    assert!(approx(structure.end_time(), 3000.0));
}

// ============================================================================
// Animation: total time & sampling
// ============================================================================

#[test]
fn total_time_requires_explicit_recompute() {
    let mut structure = AnimationStructure::new();
    structure.set_sequence("Transform.translation.x", ramp());
    let mut animation = Animation::new("a", structure, 60.0);
    assert!(approx(animation.total_time(), 1000.0));

    // Editing the structure directly does not touch the derived value...
    animation.structure.set_sequence(
        "Transform.translation.y",
        AnimationSequence::from_keys([AnimationKey::new(5000.0, 1.0)]),
    );
    assert!(approx(animation.total_time(), 1000.0));

    // ...until the caller recomputes.
    animation.calculate_total_time();
    assert!(approx(animation.total_time(), 5000.0));
}

#[test]
fn rastered_sampling_quantizes_to_frame_grid() {
    let mut structure = AnimationStructure::new();
    structure.set_sequence("Transform.translation.x", ramp());
    let animation = Animation::new("a", structure, 10.0); // 100 ms per frame

    let continuous = animation.sample(250.0, Playback::Continuous);
    let rastered = animation.sample(250.0, Playback::RasteredFps);

    let value = |m: &arbor::mutate::Mutator| {
        m.nested("Transform")
            .and_then(|t| t.nested("translation"))
            .and_then(|t| t.number("x"))
            .unwrap()
    };
    assert!(approx(value(&continuous), 2.5));
    assert!(approx(value(&rastered), 2.0), "truncated to the 200 ms frame");
}

// ============================================================================
// Animation: event crossings
// ============================================================================

fn event_animation() -> Animation {
    let mut structure = AnimationStructure::new();
    structure.set_sequence("Transform.translation.x", AnimationSequence::from_keys([
        AnimationKey::new(0.0, 0.0),
        AnimationKey::new(2000.0, 10.0),
    ]));
    let mut animation = Animation::new("a", structure, 60.0);
    animation.set_event("boom", 500.0);
    animation
}

#[test]
fn events_fire_inside_range_only() {
    let animation = event_animation();
    assert_eq!(
        animation.events_to_fire(400.0, 600.0, Playback::Continuous, 1.0),
        vec!["boom".to_string()]
    );
    assert!(animation.events_to_fire(0.0, 400.0, Playback::Continuous, 1.0).is_empty());
    // Exclusive upper bound: a range ending exactly on the trigger misses it.
    assert!(animation.events_to_fire(0.0, 500.0, Playback::Continuous, 1.0).is_empty());
    assert_eq!(
        animation.events_to_fire(500.0, 501.0, Playback::Continuous, 1.0).len(),
        1
    );
}

#[test]
fn events_fire_across_loop_wraparound() {
    let mut animation = event_animation();
    animation.set_event("late", 1900.0);

    // Range spans the loop boundary: [1800, 2000) then [0, 200).
    let fired = animation.events_to_fire(3800.0, 4200.0, Playback::Continuous, 1.0);
    assert_eq!(fired, vec!["late".to_string()]);

    // A range covering a whole extra period fires everything in it.
    let fired = animation.events_to_fire(1800.0, 4200.0, Playback::Continuous, 1.0);
    assert_eq!(fired.len(), 3, "late, boom, late");
}

#[test]
fn events_mirror_for_backward_play() {
    let animation = event_animation();
    // total 2000, trigger at 500 mirrors to 1500 when playing backwards.
    assert!(animation.events_to_fire(400.0, 600.0, Playback::Continuous, -1.0).is_empty());
    assert_eq!(
        animation.events_to_fire(1400.0, 1600.0, Playback::Continuous, -1.0),
        vec!["boom".to_string()]
    );
}

#[test]
fn empty_animation_fires_no_events() {
    let mut animation = Animation::new("empty", AnimationStructure::new(), 60.0);
    animation.set_event("never", 100.0);
    assert!(approx(animation.total_time(), 0.0));
    assert!(animation.events_to_fire(0.0, 10000.0, Playback::Continuous, 1.0).is_empty());
}

// ============================================================================
// Resource payload round trip
// ============================================================================

#[test]
fn animation_payload_round_trip() {
    let mut animation = event_animation();
    animation.set_label("half", 1000.0);

    let payload = Resource::serialize_payload(&animation);

    let mut restored = Animation::default();
    restored.deserialize_payload(&payload).unwrap();

    assert_eq!(restored.name, "a");
    assert!(approx(restored.total_time(), 2000.0), "derived state is rebuilt");
    assert!(approx(restored.event("boom").unwrap(), 500.0));
    assert!(approx(restored.label("half").unwrap(), 1000.0));
    assert_eq!(restored.structure, animation.structure);
}

#[test]
fn key_payload_defaults_are_linear() {
    let json = serde_json::json!([{ "time": 0.0, "value": 1.0 }]);
    let sequence: AnimationSequence = serde_json::from_value(json).unwrap();
    assert_eq!(sequence.get_key(0).unwrap().interpolation, KeyInterpolation::Linear);
    assert!(approx(sequence.get_key(0).unwrap().slope_out, 0.0));
}
