use std::fmt;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::animation::sequence::AnimationSequence;
use crate::mutate::Mutator;

/// One entry of an [`AnimationStructure`]: either a nested branch or a
/// sequence leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureValue {
    Branch(AnimationStructure),
    Sequence(AnimationSequence),
}

/// A tree mirroring the shape of a target [`Mutator`], with
/// [`AnimationSequence`]s at the leaves instead of scalar values.
///
/// Sampling the structure at a time produces a mutator of exactly the same
/// shape, which can be fed directly to the mutation protocol. A leaf path
/// with no settable counterpart on the live target is dropped by the
/// permissive mutate contract and surfaced in its batched warning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationStructure {
    entries: Vec<(String, StructureValue)>,
}

impl AnimationStructure {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a nested branch.
    pub fn insert_branch(&mut self, name: impl Into<String>, branch: AnimationStructure) {
        self.insert(name.into(), StructureValue::Branch(branch));
    }

    /// Inserts or replaces a sequence leaf.
    pub fn insert_sequence(&mut self, name: impl Into<String>, sequence: AnimationSequence) {
        self.insert(name.into(), StructureValue::Sequence(sequence));
    }

    fn insert(&mut self, name: String, value: StructureValue) {
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Inserts a sequence at a dot-separated path, creating intermediate
    /// branches as needed (e.g. `"Transform.translation.x"`). An existing
    /// leaf on the path is replaced by a branch.
    pub fn set_sequence(&mut self, path: &str, sequence: AnimationSequence) {
        let Some((head, rest)) = path.split_once('.') else {
            self.insert_sequence(path, sequence);
            return;
        };
        match self.entries.iter_mut().find(|(n, _)| n == head) {
            Some((_, StructureValue::Branch(branch))) => branch.set_sequence(rest, sequence),
            Some(slot) => {
                let mut branch = AnimationStructure::new();
                branch.set_sequence(rest, sequence);
                slot.1 = StructureValue::Branch(branch);
            }
            None => {
                let mut branch = AnimationStructure::new();
                branch.set_sequence(rest, sequence);
                self.entries.push((head.to_string(), StructureValue::Branch(branch)));
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StructureValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Resolves a dot-separated path to a sequence leaf.
    #[must_use]
    pub fn sequence_at(&self, path: &str) -> Option<&AnimationSequence> {
        match path.split_once('.') {
            Some((head, rest)) => match self.get(head)? {
                StructureValue::Branch(branch) => branch.sequence_at(rest),
                StructureValue::Sequence(_) => None,
            },
            None => match self.get(path)? {
                StructureValue::Sequence(sequence) => Some(sequence),
                StructureValue::Branch(_) => None,
            },
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StructureValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Samples every leaf at `time`, producing a mutator that structurally
    /// mirrors this tree.
    #[must_use]
    pub fn sample(&self, time: f64) -> Mutator {
        let mut mutator = Mutator::new();
        for (name, value) in &self.entries {
            match value {
                StructureValue::Sequence(sequence) => {
                    mutator.insert(name.clone(), sequence.evaluate(time));
                }
                StructureValue::Branch(branch) => {
                    mutator.insert(name.clone(), branch.sample(time));
                }
            }
        }
        mutator
    }

    /// Maximum key time over all leaves, in milliseconds.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.entries
            .iter()
            .map(|(_, value)| match value {
                StructureValue::Sequence(sequence) => sequence.end_time(),
                StructureValue::Branch(branch) => branch.end_time(),
            })
            .fold(0.0, f64::max)
    }
}

// ============================================================================
// Serde: branch = JSON object, leaf = JSON array of keys.
// ============================================================================

impl Serialize for AnimationStructure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for StructureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StructureValue::Branch(branch) => branch.serialize(serializer),
            StructureValue::Sequence(sequence) => sequence.serialize(serializer),
        }
    }
}

struct StructureVisitor;

impl<'de> Visitor<'de> for StructureVisitor {
    type Value = AnimationStructure;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of branch objects and sequence arrays")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut structure = AnimationStructure::new();
        while let Some((name, value)) = access.next_entry::<String, StructureValue>()? {
            structure.insert(name, value);
        }
        Ok(structure)
    }
}

impl<'de> Deserialize<'de> for AnimationStructure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StructureVisitor)
    }
}

struct StructureValueVisitor;

impl<'de> Visitor<'de> for StructureValueVisitor {
    type Value = StructureValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a branch object or a sequence array")
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Self::Value, A::Error> {
        StructureVisitor.visit_map(access).map(StructureValue::Branch)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut sequence = AnimationSequence::new();
        while let Some(key) = access.next_element()? {
            sequence.add_key(key);
        }
        Ok(StructureValue::Sequence(sequence))
    }
}

impl<'de> Deserialize<'de> for StructureValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StructureValueVisitor)
    }
}
