use std::any::Any;

use glam::{Affine3A, EulerRot, Quat, Vec3};

use crate::mutate::mutable::{apply_vec3, vec3_mutator};
use crate::mutate::{Mutable, Mutator, MutatorValue};
use crate::scene::{Component, NodeKey};

/// TRS transform component.
///
/// Owns a node's local transform as translation, Euler rotation (degrees,
/// XYZ order) and scale, plus the cached local matrix and the dirty-check
/// state. The rotation is kept in Euler angles because the mutation and
/// animation protocols address scalar channels (`rotation.x` etc.);
/// quaternion composition happens only at matrix build time.
#[derive(Debug, Clone)]
pub struct Transform {
    node: Option<NodeKey>,

    // === Public channels ===
    pub translation: Vec3,
    /// Euler angles in degrees, applied in XYZ order.
    pub rotation: Vec3,
    pub scale: Vec3,

    // === Matrix cache ===
    local_matrix: Affine3A,

    // === Shadow state for the dirty check ===
    last_translation: Vec3,
    last_rotation: Vec3,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    /// Serialization type tag.
    pub const TYPE: &'static str = "Transform";

    #[must_use]
    pub fn new() -> Self {
        Self {
            node: None,
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            local_matrix: Affine3A::IDENTITY,
            last_translation: Vec3::ZERO,
            last_rotation: Vec3::ZERO,
            last_scale: Vec3::ONE,
            force_update: true,
        }
    }

    /// Checks the public channels against the shadow state and recomputes
    /// the local matrix if anything changed. Returns whether it did.
    pub fn update_local_matrix(&mut self) -> bool {
        let changed = self.translation != self.last_translation
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.local_matrix = Affine3A::from_scale_rotation_translation(
                self.scale,
                self.rotation_quat(),
                self.translation,
            );

            self.last_translation = self.translation;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    /// The cached local matrix. Valid after [`update_local_matrix`].
    ///
    /// [`update_local_matrix`]: Transform::update_local_matrix
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    /// The rotation channels as a quaternion.
    #[must_use]
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        )
    }

    /// Forces a matrix recompute on the next update, e.g. after the node
    /// was re-parented.
    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Mutable for Transform {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn collect_fields(&self, mutator: &mut Mutator) {
        mutator.insert("translation", vec3_mutator(self.translation));
        mutator.insert("rotation", vec3_mutator(self.rotation));
        mutator.insert("scale", vec3_mutator(self.scale));
    }

    fn apply_field(&mut self, name: &str, value: &MutatorValue) -> bool {
        let Some(nested) = value.as_nested() else {
            return false;
        };
        match name {
            "translation" => apply_vec3(&mut self.translation, nested),
            "rotation" => apply_vec3(&mut self.rotation, nested),
            "scale" => apply_vec3(&mut self.scale, nested),
            _ => return false,
        }
        true
    }
}

impl Component for Transform {
    fn node(&self) -> Option<NodeKey> {
        self.node
    }

    fn set_node(&mut self, node: Option<NodeKey>) {
        self.node = node;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
