use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::{DualState, SimulationMode};
use crate::config::{default_gravity, DEFAULT_FRICTION};

/// Kinematic state of a rigid body that is authored and then simulated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyState {
    pub velocity: Vec3,
    pub friction: f32,
    pub gravity_enabled: bool,
    pub gravity: Vec3,
    pub falling: bool,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            friction: DEFAULT_FRICTION,
            gravity_enabled: true,
            gravity: default_gravity(),
            falling: false,
        }
    }
}

/// Rigid body component: linear velocity under gravity, friction and user forces.
///
/// Bodies have unit mass and no angular state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RigidBody {
    state: DualState<BodyState>,
    #[serde(skip)]
    pending_force: Vec3,
}

impl RigidBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: BodyState) -> Self {
        Self {
            state: DualState::new(state),
            pending_force: Vec3::ZERO,
        }
    }

    pub fn builder() -> RigidBodyBuilder {
        RigidBodyBuilder::new()
    }

    pub fn state(&self) -> &BodyState {
        self.state.get()
    }

    pub fn state_mut(&mut self) -> &mut BodyState {
        self.state.get_mut()
    }

    pub fn initial_state(&self) -> &BodyState {
        self.state.initial()
    }

    pub fn mode(&self) -> SimulationMode {
        self.state.mode()
    }

    pub fn velocity(&self) -> Vec3 {
        self.state().velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.state_mut().velocity = velocity;
    }

    pub fn is_falling(&self) -> bool {
        self.state().falling
    }

    pub fn set_gravity_enabled(&mut self, enabled: bool) {
        self.state_mut().gravity_enabled = enabled;
    }

    /// Queues a force consumed by the next fixed step.
    pub fn apply_force(&mut self, force: Vec3) {
        self.pending_force += force;
    }

    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.state_mut().velocity += impulse;
    }

    pub fn pending_force(&self) -> Vec3 {
        self.pending_force
    }

    /// Gravity, scaled by `dt` and the world's damping factor.
    pub fn apply_gravity(&mut self, dt: f32, damping: f32) {
        let state = self.state_mut();
        if state.gravity_enabled {
            state.velocity += state.gravity * dt * damping;
        }
    }

    /// Velocity-proportional friction on the horizontal (XZ) plane.
    pub fn apply_friction(&mut self, dt: f32) {
        let state = self.state_mut();
        let keep = (1.0 - state.friction * dt).max(0.0);
        state.velocity.x *= keep;
        state.velocity.z *= keep;
    }

    pub(crate) fn apply_pending_force(&mut self, dt: f32) {
        let force = std::mem::take(&mut self.pending_force);
        self.state_mut().velocity += force * dt;
    }

    pub(crate) fn refresh_falling(&mut self) {
        let state = self.state_mut();
        state.falling = state.gravity_enabled && state.velocity.dot(state.gravity) > 0.0;
    }

    /// Collision feedback: being pushed against gravity means the body landed.
    pub fn on_collision(&mut self, correction: Vec3) {
        let state = self.state_mut();
        if correction.dot(state.gravity) < 0.0 {
            state.falling = false;
        }
    }

    pub fn start(&mut self) {
        self.state.start();
        self.pending_force = Vec3::ZERO;
    }

    pub fn stop(&mut self) {
        self.state.stop();
        self.pending_force = Vec3::ZERO;
    }
}

pub struct RigidBodyBuilder {
    state: BodyState,
}

impl Default for RigidBodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBodyBuilder {
    pub fn new() -> Self {
        Self {
            state: BodyState::default(),
        }
    }

    pub fn velocity(mut self, velocity: Vec3) -> Self {
        self.state.velocity = velocity;
        self
    }

    pub fn friction(mut self, friction: f32) -> Self {
        self.state.friction = friction;
        self
    }

    pub fn gravity(mut self, gravity: Vec3) -> Self {
        self.state.gravity = gravity;
        self
    }

    pub fn gravity_enabled(mut self, enabled: bool) -> Self {
        self.state.gravity_enabled = enabled;
        self
    }

    pub fn build(self) -> RigidBody {
        RigidBody::from_state(self.state)
    }
}
