use crate::mutate::mutator::{Mutator, MutatorValue};

/// Runtime type descriptor of a single mutator field.
///
/// Used by animation and UI tooling to present fields without recursing
/// into nested objects. Enum-like fields carry their full variant set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeType {
    Number,
    Bool,
    String,
    /// A nested mutable object, tagged with its runtime type name.
    Nested(&'static str),
    /// An enum-like field, with the set of legal values.
    Enum(&'static [&'static str]),
}

/// Field-name to type-descriptor pairs, in mutator order.
pub type MutatorAttributeTypes = Vec<(String, AttributeType)>;

/// Base trait for all types whose state can be captured in and restored
/// from a [`Mutator`].
///
/// Instead of runtime reflection, each implementor enumerates its
/// reflectable fields explicitly in [`collect_fields`], in declaration
/// order. The derived snapshot can be reduced by [`reduce_mutator`] to hide
/// internal fields, and is structurally frozen afterwards.
///
/// [`collect_fields`]: Mutable::collect_fields
/// [`reduce_mutator`]: Mutable::reduce_mutator
pub trait Mutable {
    /// Stable runtime type name, used as serialization tag and for
    /// diagnostics. Must match the name the type registers under.
    fn type_name(&self) -> &'static str;

    /// Writes every reflectable field into `mutator`, nesting mutable
    /// sub-objects as nested mutators. An absent optional sub-object
    /// contributes an empty nested mutator.
    fn collect_fields(&self, mutator: &mut Mutator);

    /// Hook for hiding fields from the collected snapshot, e.g. derived
    /// caches. The default hides nothing.
    fn reduce_mutator(&self, _mutator: &mut Mutator) {}

    /// Collects the reflectable state of this object into a fresh mutator.
    ///
    /// The result is frozen: it can be reduced but not extended, though
    /// values of existing keys may still be replaced.
    fn get_mutator(&self) -> Mutator {
        let mut mutator = Mutator::new();
        self.collect_fields(&mut mutator);
        self.reduce_mutator(&mut mutator);
        mutator.freeze();
        mutator
    }

    /// Applies a single field from a mutator. Returns `false` if the field
    /// name is unknown to this type.
    fn apply_field(&mut self, name: &str, value: &MutatorValue) -> bool;

    /// Updates this object according to the state of the given mutator.
    ///
    /// Every key present in the mutator is applied; nested mutators recurse
    /// into the corresponding sub-object. Keys with no counterpart on this
    /// type are ignored, and reported once as a single batched warning.
    /// Applying the same mutator twice yields the same state as applying it
    /// once.
    fn mutate(&mut self, mutator: &Mutator) {
        let mut dropped: Vec<&str> = Vec::new();
        for (name, value) in mutator.iter() {
            if !self.apply_field(name, value) {
                dropped.push(name);
            }
        }
        if !dropped.is_empty() {
            log::warn!(
                "{}: ignored unknown mutator keys {:?}",
                self.type_name(),
                dropped
            );
        }
        self.after_mutate();
    }

    /// Hook invoked once after all fields of a mutate call were applied.
    fn after_mutate(&mut self) {}

    /// Describes the runtime type of each field in the given mutator
    /// without recursing into nested objects.
    ///
    /// The default infers the descriptor from the value kind; implementors
    /// with enum-like string fields override this to report the variant
    /// set.
    fn mutator_attribute_types(&self, mutator: &Mutator) -> MutatorAttributeTypes {
        mutator
            .iter()
            .map(|(name, value)| {
                let ty = match value {
                    MutatorValue::Number(_) => AttributeType::Number,
                    MutatorValue::Bool(_) => AttributeType::Bool,
                    MutatorValue::String(_) => AttributeType::String,
                    MutatorValue::Nested(_) => AttributeType::Nested(""),
                };
                (name.to_string(), ty)
            })
            .collect()
    }
}

// ============================================================================
// Helpers for the common nested shapes
// ============================================================================

/// Builds the `{x, y, z}` mutator of a vector.
#[must_use]
pub(crate) fn vec3_mutator(v: glam::Vec3) -> Mutator {
    let mut m = Mutator::new();
    m.insert("x", v.x);
    m.insert("y", v.y);
    m.insert("z", v.z);
    m
}

/// Applies the present keys of an `{x, y, z}` mutator onto a vector.
pub(crate) fn apply_vec3(target: &mut glam::Vec3, mutator: &Mutator) {
    if let Some(x) = mutator.number("x") {
        target.x = x as f32;
    }
    if let Some(y) = mutator.number("y") {
        target.y = y as f32;
    }
    if let Some(z) = mutator.number("z") {
        target.z = z as f32;
    }
}
