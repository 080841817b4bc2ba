use glam::Vec3;

use crate::{
    config::PhysicsConfig,
    core::{rigidbody::RigidBody, scene::Scene, transform::Transform},
    error::{PhysicsError, Result},
};

/// Explicit Euler integrator for linear motion.
#[derive(Debug, Clone)]
pub struct Integrator {
    pub gravity_damping: f32,
}

impl Default for Integrator {
    fn default() -> Self {
        Self::from_config(&PhysicsConfig::default())
    }
}

impl Integrator {
    pub fn new(gravity_damping: f32) -> Self {
        Self { gravity_damping }
    }

    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(config.gravity_damping)
    }

    /// Gravity, queued forces and horizontal friction, then position by the new velocity.
    pub fn integrate_body(&self, transform: &mut Transform, body: &mut RigidBody, dt: f32) {
        body.apply_gravity(dt, self.gravity_damping);
        body.apply_pending_force(dt);
        body.apply_friction(dt);

        let delta = body.velocity() * dt;
        if delta != Vec3::ZERO {
            transform.translate(delta);
        }
        body.refresh_falling();
    }

    /// Integrates every object carrying a rigid body; returns how many were moved.
    pub fn step(&self, scene: &mut Scene, dt: f32) -> Result<usize> {
        let mut count = 0;
        for (id, object) in scene.iter_mut() {
            match object.components.body_parts_mut() {
                (_, None) => continue,
                (None, Some(_)) => return Err(PhysicsError::MissingTransform(id)),
                (Some(transform), Some(body)) => {
                    self.integrate_body(transform, body, dt);
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::Object;
    use approx::assert_relative_eq;

    #[test]
    fn gravity_is_damped_and_scaled_by_dt() {
        let integrator = Integrator::new(0.9);
        let mut transform = Transform::default();
        let mut body = RigidBody::new();

        integrator.integrate_body(&mut transform, &mut body, 0.02);
        assert_relative_eq!(body.velocity().y, -9.81 * 0.02 * 0.9, epsilon = 1e-6);
        assert_relative_eq!(transform.position().y, body.velocity().y * 0.02, epsilon = 1e-6);
        assert!(body.is_falling());
    }

    #[test]
    fn queued_force_is_consumed_once() {
        let integrator = Integrator::new(0.9);
        let mut transform = Transform::default();
        let mut body = RigidBody::builder().gravity_enabled(false).friction(0.0).build();
        body.apply_force(Vec3::new(0.0, 10.0, 0.0));

        integrator.integrate_body(&mut transform, &mut body, 0.1);
        assert_relative_eq!(body.velocity().y, 1.0, epsilon = 1e-6);
        integrator.integrate_body(&mut transform, &mut body, 0.1);
        assert_relative_eq!(body.velocity().y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn resting_body_keeps_its_transform_version() {
        let integrator = Integrator::new(0.9);
        let mut transform = Transform::default();
        let mut body = RigidBody::builder().gravity_enabled(false).build();
        let version = transform.version();

        integrator.integrate_body(&mut transform, &mut body, 0.02);
        assert_eq!(transform.version(), version);
    }

    #[test]
    fn body_without_transform_fails_the_step() {
        let mut scene = Scene::new();
        let mut object = Object::empty("loose");
        object.components.insert(RigidBody::new());
        let id = scene.insert(object);

        let result = Integrator::default().step(&mut scene, 0.02);
        assert_eq!(result, Err(PhysicsError::MissingTransform(id)));
    }
}
