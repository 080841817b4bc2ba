//! Sweep Collide – convex collision detection and response for Rust.
//!
//! Boxes and spheres are tested with GJK, penetration depth comes from EPA, a
//! one-axis sweep keeps the pair count down, and a sequential resolver applies
//! positional correction and equal-mass impulses after every fixed step.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod utils;
pub mod world;

pub use glam::{Quat, Vec3};

pub use collision::{
    broadphase::{CandidatePair, SweepAndPrune},
    narrowphase::{NarrowPhase, Penetration},
    support::{ColliderView, PlacedShape, SupportShape},
};
pub use config::PhysicsConfig;
pub use crate::core::{
    collider::{Aabb, Collider, ColliderShape, ShapeType},
    object::Object,
    rigidbody::{BodyState, RigidBody},
    state::SimulationMode,
    transform::{Transform, WorldTransform},
};
pub use dynamics::{integrator::Integrator, resolver::CollisionEvent};
pub use error::{PhysicsError, Result};
pub use utils::{allocator::ObjectId, profiling::StepProfile};
pub use world::{CollisionListener, PhysicsWorld};

/// High-level convenience wrapper that owns a [`PhysicsWorld`].
pub struct PhysicsEngine {
    world: PhysicsWorld,
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsEngine {
    /// Creates an engine running at the default 50 Hz fixed step.
    pub fn new() -> Self {
        Self {
            world: PhysicsWorld::new(),
        }
    }

    pub fn with_config(config: PhysicsConfig) -> Result<Self> {
        Ok(Self {
            world: PhysicsWorld::with_config(config)?,
        })
    }

    /// Adds an object at `position` with the given collider shape and returns its id.
    pub fn add_static(&mut self, name: &str, position: Vec3, shape: ColliderShape) -> Result<ObjectId> {
        let id = self.world.create_object(name);
        self.world.transform_mut(id)?.set_position(position);
        self.world.add_collider(id, Collider::new(shape))?;
        Ok(id)
    }

    /// Same as [`PhysicsEngine::add_static`], plus a rigid body.
    pub fn add_body(
        &mut self,
        name: &str,
        position: Vec3,
        shape: ColliderShape,
        body: RigidBody,
    ) -> Result<ObjectId> {
        let id = self.add_static(name, position, shape)?;
        self.world.add_rigidbody(id, body)?;
        Ok(id)
    }

    pub fn start(&mut self) {
        self.world.start();
    }

    pub fn stop(&mut self) {
        self.world.stop();
    }

    /// Feeds a frame's elapsed time into the fixed-step loop; returns the steps run.
    pub fn step(&mut self, frame_dt: f32) -> u32 {
        self.world.update(frame_dt)
    }

    /// Enables or disables the worker pool for the collision sweep.
    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        self.world.set_parallel_sweep(enabled);
    }

    /// Returns whether the sweep is currently using its worker pool.
    pub fn parallel_enabled(&self) -> bool {
        self.world.sweep().is_parallel()
    }

    pub fn position(&self, id: ObjectId) -> Result<Vec3> {
        Ok(self.world.world_transform(id)?.position)
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }
}
