use std::collections::HashSet;

use glam::Vec3;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    collision::{broadphase::CandidatePair, narrowphase::NarrowPhase},
    config::PhysicsConfig,
    core::scene::Scene,
    error::Result,
    utils::allocator::ObjectId,
};

/// A resolved contact as seen from `object`.
///
/// `mtv` is the full separation that moves `object` out of `other`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub object: ObjectId,
    pub other: Option<ObjectId>,
    pub mtv: Vec3,
}

#[derive(Debug, Clone, Copy)]
struct RankedContact {
    other: ObjectId,
    /// Pushes `other` out of the body being resolved.
    mtv: Vec3,
    metric: f32,
}

/// Sequential positional correction and equal-mass impulses.
///
/// Runs after detection has finished, so every body is touched by one contact
/// at a time regardless of how the sweep was scheduled.
#[derive(Debug, Clone)]
pub struct Resolver {
    pub restitution: f32,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::from_config(&PhysicsConfig::default())
    }
}

impl Resolver {
    pub fn new(restitution: f32) -> Self {
        Self { restitution }
    }

    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(config.restitution)
    }

    /// Resolves every body's collided set, bodies in the order they first
    /// appear in `pairs`. Each unordered pair is resolved at most once.
    pub fn resolve(&self, scene: &mut Scene, pairs: &[CandidatePair]) -> Result<Vec<CollisionEvent>> {
        let mut events = Vec::new();
        let mut resolved: HashSet<(ObjectId, ObjectId)> = HashSet::new();

        for (body, others) in collided_sets(scene, pairs) {
            let contacts = self.rank(scene, body, &others, &resolved)?;
            for contact in contacts {
                let key = CandidatePair {
                    first: body,
                    second: contact.other,
                }
                .key();
                if !resolved.insert(key) {
                    continue;
                }
                self.apply(scene, body, contact, &mut events)?;
            }
        }

        Ok(events)
    }

    /// Penetration of each collided object, deepest first, zero-depth entries dropped.
    fn rank(
        &self,
        scene: &Scene,
        body: ObjectId,
        others: &[ObjectId],
        resolved: &HashSet<(ObjectId, ObjectId)>,
    ) -> Result<Vec<RankedContact>> {
        let body_view = scene.collider_view(body)?;
        let mut contacts = Vec::with_capacity(others.len());

        for &other in others {
            let key = CandidatePair {
                first: body,
                second: other,
            }
            .key();
            if resolved.contains(&key) {
                continue;
            }
            let other_view = scene.collider_view(other)?;
            let Some(mtv) = NarrowPhase::penetration(&other_view, &body_view) else {
                continue;
            };
            let metric = mtv.length_squared();
            if metric > 0.0 {
                contacts.push(RankedContact { other, mtv, metric });
            }
        }

        contacts.sort_by(|lhs, rhs| rhs.metric.total_cmp(&lhs.metric));
        Ok(contacts)
    }

    fn apply(
        &self,
        scene: &mut Scene,
        body: ObjectId,
        contact: RankedContact,
        events: &mut Vec<CollisionEvent>,
    ) -> Result<()> {
        let RankedContact { other, mtv, .. } = contact;
        let normal = (-mtv).normalize_or_zero();
        let other_is_body = scene.object(other)?.has_rigidbody();

        if other_is_body {
            let Some((body_object, other_object)) = scene.pair_mut(body, other) else {
                return Ok(());
            };
            let (Some(body_transform), Some(body_rb)) = body_object.components.body_parts_mut() else {
                return Ok(());
            };
            let (Some(other_transform), Some(other_rb)) = other_object.components.body_parts_mut()
            else {
                return Ok(());
            };

            // Half each, so the pair ends exactly touching.
            body_transform.translate(-mtv * 0.5);
            other_transform.translate(mtv * 0.5);

            let closing = (body_rb.velocity() - other_rb.velocity()).dot(normal);
            if closing < 0.0 {
                let impulse = (1.0 + self.restitution) * closing * 0.5;
                body_rb.set_velocity(body_rb.velocity() - normal * impulse);
                other_rb.set_velocity(other_rb.velocity() + normal * impulse);
            }

            body_rb.on_collision(-mtv);
            other_rb.on_collision(mtv);
            trace!("resolved {body:?} against body {other:?}, depth {}", mtv.length());
        } else {
            let object = scene.object_mut(body)?;
            let (Some(transform), Some(rb)) = object.components.body_parts_mut() else {
                return Ok(());
            };

            transform.translate(-mtv);
            let into_surface = rb.velocity().dot(normal);
            if into_surface < 0.0 {
                rb.set_velocity(rb.velocity() - normal * into_surface);
            }
            rb.on_collision(-mtv);
            trace!("resolved {body:?} against static {other:?}, depth {}", mtv.length());
        }

        events.push(CollisionEvent {
            object: body,
            other: Some(other),
            mtv: -mtv,
        });
        if other_is_body {
            events.push(CollisionEvent {
                object: other,
                other: Some(body),
                mtv,
            });
        }
        Ok(())
    }
}

/// Rigid bodies and the objects they touch, in sweep order.
fn collided_sets(scene: &Scene, pairs: &[CandidatePair]) -> Vec<(ObjectId, Vec<ObjectId>)> {
    let mut sets: Vec<(ObjectId, Vec<ObjectId>)> = Vec::new();
    let has_body = |id: ObjectId| scene.object(id).is_ok_and(|object| object.has_rigidbody());

    for pair in pairs {
        for (body, other) in [(pair.first, pair.second), (pair.second, pair.first)] {
            if !has_body(body) {
                continue;
            }
            match sets.iter_mut().find(|(id, _)| *id == body) {
                Some((_, others)) => others.push(other),
                None => sets.push((body, vec![other])),
            }
        }
    }
    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        collider::{Collider, ColliderShape},
        object::Object,
        rigidbody::RigidBody,
        transform::Transform,
    };
    use approx::assert_relative_eq;

    fn spawn(scene: &mut Scene, position: Vec3, scale: Vec3, body: Option<RigidBody>) -> ObjectId {
        let mut object = Object::empty("cube");
        object
            .components
            .insert(Transform::from_position_scale(position, scale));
        object.components.insert(Collider::new(ColliderShape::unit_box()));
        if let Some(body) = body {
            object.components.insert(body);
        }
        scene.insert(object)
    }

    fn falling(velocity: Vec3) -> RigidBody {
        RigidBody::builder()
            .velocity(velocity)
            .gravity_enabled(false)
            .build()
    }

    #[test]
    fn body_is_lifted_off_static_ground_and_stopped() {
        let mut scene = Scene::new();
        let ground = spawn(&mut scene, Vec3::new(0.0, -1.0, 0.0), Vec3::new(10.0, 1.0, 10.0), None);
        let cube = spawn(
            &mut scene,
            Vec3::new(0.0, -0.1, 0.0),
            Vec3::ONE,
            Some(falling(Vec3::new(1.0, -2.0, 0.0))),
        );

        let pairs = [CandidatePair {
            first: ground,
            second: cube,
        }];
        let events = Resolver::new(1.0).resolve(&mut scene, &pairs).expect("resolve");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].object, cube);
        assert_relative_eq!(events[0].mtv.y, 0.1, epsilon = 1e-3);
        let position = scene.transform(cube).expect("transform").position();
        assert_relative_eq!(position.y, 0.0, epsilon = 1e-3);
        let velocity = scene.rigidbody(cube).expect("body").velocity();
        assert_relative_eq!(velocity.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(velocity.x, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn separating_body_keeps_its_velocity() {
        let mut scene = Scene::new();
        let ground = spawn(&mut scene, Vec3::new(0.0, -1.0, 0.0), Vec3::new(10.0, 1.0, 10.0), None);
        let cube = spawn(
            &mut scene,
            Vec3::new(0.0, -0.1, 0.0),
            Vec3::ONE,
            Some(falling(Vec3::new(0.0, 3.0, 0.0))),
        );

        let pairs = [CandidatePair {
            first: ground,
            second: cube,
        }];
        Resolver::new(1.0).resolve(&mut scene, &pairs).expect("resolve");
        assert_relative_eq!(scene.rigidbody(cube).expect("body").velocity().y, 3.0);
    }

    #[test]
    fn converging_bodies_exchange_velocity() {
        let mut scene = Scene::new();
        let left = spawn(&mut scene, Vec3::ZERO, Vec3::ONE, Some(falling(Vec3::new(2.0, 0.0, 0.0))));
        let right = spawn(&mut scene, Vec3::new(0.9, 0.0, 0.0), Vec3::ONE, Some(falling(Vec3::ZERO)));

        let pairs = [CandidatePair {
            first: left,
            second: right,
        }];
        let events = Resolver::new(1.0).resolve(&mut scene, &pairs).expect("resolve");
        assert_eq!(events.len(), 2);

        let left_velocity = scene.rigidbody(left).expect("left").velocity();
        let right_velocity = scene.rigidbody(right).expect("right").velocity();
        assert_relative_eq!(left_velocity.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(right_velocity.x, 2.0, epsilon = 1e-4);

        let gap = scene.transform(right).expect("right").position().x
            - scene.transform(left).expect("left").position().x;
        assert_relative_eq!(gap, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn each_pair_is_resolved_once() {
        let mut scene = Scene::new();
        let left = spawn(&mut scene, Vec3::ZERO, Vec3::ONE, Some(falling(Vec3::ZERO)));
        let right = spawn(&mut scene, Vec3::new(0.9, 0.0, 0.0), Vec3::ONE, Some(falling(Vec3::ZERO)));

        let pairs = [
            CandidatePair {
                first: left,
                second: right,
            },
            CandidatePair {
                first: right,
                second: left,
            },
        ];
        let events = Resolver::new(1.0).resolve(&mut scene, &pairs).expect("resolve");
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn touching_without_depth_is_skipped() {
        let mut scene = Scene::new();
        let ground = spawn(&mut scene, Vec3::new(0.0, -5.0, 0.0), Vec3::ONE, None);
        let cube = spawn(&mut scene, Vec3::ZERO, Vec3::ONE, Some(falling(Vec3::ZERO)));

        let pairs = [CandidatePair {
            first: ground,
            second: cube,
        }];
        let events = Resolver::new(1.0).resolve(&mut scene, &pairs).expect("resolve");
        assert!(events.is_empty());
    }
}
