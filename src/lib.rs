#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod errors;
pub mod mutate;
pub mod scene;
pub mod serialization;
pub mod time;

pub use animation::{
    Animation, AnimationKey, AnimationSequence, AnimationStructure, Animator, KeyInterpolation,
    Playback, Playmode,
};
pub use errors::{ArborError, Result};
pub use mutate::{AttributeType, Mutable, Mutator, MutatorValue};
pub use scene::{Component, ComponentKey, Graph, GraphEvent, Material, Node, NodeKey, Transform};
pub use serialization::{FsLoader, Project, Resource, ResourceLoader, Serialization};
pub use time::{Clock, FrameTick};
