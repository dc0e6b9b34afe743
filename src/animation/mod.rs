//! Keyframe animation.
//!
//! An [`Animation`] owns an [`AnimationStructure`]: a tree mirroring the
//! shape of a target mutator whose leaves are [`AnimationSequence`]s.
//! Sampling the structure at a point in time produces a full [`Mutator`]
//! that feeds straight into the mutation protocol. The [`Animator`]
//! component drives sampling from the external frame clock and applies the
//! result to its owning node.
//!
//! [`Mutator`]: crate::mutate::Mutator

pub mod animation;
pub mod animator;
pub mod key;
pub mod sequence;
pub mod structure;
pub mod system;

pub use animation::Animation;
pub use animator::{Animator, Playback, Playmode};
pub use key::{AnimationKey, KeyInterpolation};
pub use sequence::AnimationSequence;
pub use structure::{AnimationStructure, StructureValue};
