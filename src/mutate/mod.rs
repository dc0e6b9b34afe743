//! Reflective mutation protocol.
//!
//! A [`Mutator`] is a plain structural snapshot of an object's reflectable
//! state: an ordered mapping from field name to a primitive value or a
//! nested mutator. Types opt into the protocol by implementing [`Mutable`],
//! which enumerates fields explicitly rather than through runtime
//! reflection, so the set of reflectable fields is fixed at compile time.
//!
//! Mutators are transient: they are built fresh on every query and never
//! cached by the protocol.

pub mod mutable;
pub mod mutator;

pub use mutable::{AttributeType, Mutable, MutatorAttributeTypes};
pub use mutator::{Mutator, MutatorValue};
