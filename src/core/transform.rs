use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::state::{DualState, SimulationMode};

/// Position, Euler rotation (radians, XYZ) and scale of an object relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformValues {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for TransformValues {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Local transform component with authored/runtime values and a change counter.
///
/// The counter wraps at 256 and is bumped by every mutation, including mode
/// switches; colliders use it to decide when cached bounds are stale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transform {
    values: DualState<TransformValues>,
    version: u8,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            values: DualState::new(TransformValues {
                position,
                rotation,
                scale,
            }),
            version: 0,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Vec3::ZERO, Vec3::ONE)
    }

    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self::new(position, Vec3::ZERO, scale)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn mode(&self) -> SimulationMode {
        self.values.mode()
    }

    pub fn values(&self) -> &TransformValues {
        self.values.get()
    }

    pub fn initial_values(&self) -> &TransformValues {
        self.values.initial()
    }

    pub fn position(&self) -> Vec3 {
        self.values.get().position
    }

    pub fn rotation(&self) -> Vec3 {
        self.values.get().rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.values.get().scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.mutate(|values| values.position = position);
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.mutate(|values| values.position += delta);
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.mutate(|values| values.rotation = rotation);
    }

    pub fn rotate(&mut self, delta: Vec3) {
        self.mutate(|values| values.rotation += delta);
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.mutate(|values| values.scale = scale);
    }

    pub fn start(&mut self) {
        self.values.start();
        self.bump();
    }

    pub fn stop(&mut self) {
        self.values.stop();
        self.bump();
    }

    fn mutate(&mut self, apply: impl FnOnce(&mut TransformValues)) {
        apply(self.values.get_mut());
        self.bump();
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

/// Transform composed through the parent chain.
///
/// `stamp` folds the version counters of every transform in the chain, so a
/// moving parent also invalidates data cached against its children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub stamp: u32,
}

impl WorldTransform {
    pub fn from_local(local: &Transform) -> Self {
        let values = local.values();
        Self {
            position: values.position,
            rotation: values.rotation,
            scale: values.scale,
            stamp: u32::from(local.version()),
        }
    }

    /// Applies a child's local transform on top of this (parent) world transform.
    pub fn compose(&self, child: &Transform) -> Self {
        let values = child.values();
        Self {
            position: self.position + values.position,
            rotation: self.rotation + values.rotation,
            scale: self.scale * values.scale,
            stamp: self
                .stamp
                .wrapping_mul(257)
                .wrapping_add(u32::from(child.version())),
        }
    }

    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mutation_bumps_the_version() {
        let mut transform = Transform::default();
        let v0 = transform.version();
        transform.translate(Vec3::X);
        transform.set_scale(Vec3::splat(2.0));
        transform.rotate(Vec3::Y);
        assert_eq!(transform.version(), v0.wrapping_add(3));
    }

    #[test]
    fn version_wraps_instead_of_overflowing() {
        let mut transform = Transform::default();
        for _ in 0..300 {
            transform.translate(Vec3::X);
        }
        assert_eq!(transform.version(), (300 % 256) as u8);
    }

    #[test]
    fn stop_restores_authored_position() {
        let mut transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        transform.start();
        transform.translate(Vec3::splat(5.0));
        assert_eq!(transform.position(), Vec3::new(6.0, 7.0, 8.0));

        transform.stop();
        assert_eq!(transform.position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn world_composition_adds_position_and_multiplies_scale() {
        let parent = Transform::new(Vec3::new(1.0, 0.0, 0.0), Vec3::Z, Vec3::splat(2.0));
        let child = Transform::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, Vec3::new(1.0, 3.0, 1.0));

        let world = WorldTransform::from_local(&parent).compose(&child);
        assert_eq!(world.position, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(world.rotation, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(world.scale, Vec3::new(2.0, 6.0, 2.0));
    }
}
