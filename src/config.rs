//! Global configuration for the Sweep Collide engine.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Default gravity vector applied to new rigid bodies (Y-up).
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, -9.81, 0.0];

/// Default fixed simulation timestep (50 Hz).
pub const DEFAULT_FIXED_TIME_STEP: f32 = 1.0 / 50.0;

/// Maximum number of fixed steps run per frame before accumulated time is dropped.
pub const DEFAULT_MAX_CATCH_UP_STEPS: u32 = 3;

/// Scale applied to gravity on every step.
pub const DEFAULT_GRAVITY_DAMPING: f32 = 0.9;

/// Default horizontal friction coefficient of a rigid body.
pub const DEFAULT_FRICTION: f32 = 0.5;

/// Default restitution used by the equal-mass impulse model.
pub const DEFAULT_RESTITUTION: f32 = 1.0;

/// Worker count of the broad-phase thread pool.
pub const DEFAULT_SWEEP_WORKERS: usize = 6;

/// GJK gives up (reports no collision) after this many support evaluations.
pub const GJK_MAX_ITERATIONS: usize = 50;

/// EPA returns its best estimate after this many expansions.
pub const EPA_MAX_ITERATIONS: usize = 25;

/// Absolute tolerance of the EPA convergence check.
pub const EPA_TOLERANCE: f32 = 1e-5;

/// Runtime tunables of a [`crate::PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub fixed_time_step: f32,
    pub max_catch_up_steps: u32,
    pub gravity_damping: f32,
    pub restitution: f32,
    pub sweep_workers: usize,
    pub parallel_sweep: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_time_step: DEFAULT_FIXED_TIME_STEP,
            max_catch_up_steps: DEFAULT_MAX_CATCH_UP_STEPS,
            gravity_damping: DEFAULT_GRAVITY_DAMPING,
            restitution: DEFAULT_RESTITUTION,
            sweep_workers: DEFAULT_SWEEP_WORKERS,
            parallel_sweep: cfg!(feature = "parallel"),
        }
    }
}

impl PhysicsConfig {
    pub fn with_fixed_time_step(mut self, dt: f32) -> Self {
        self.fixed_time_step = dt;
        self
    }

    pub fn with_max_catch_up_steps(mut self, steps: u32) -> Self {
        self.max_catch_up_steps = steps;
        self
    }

    pub fn with_gravity_damping(mut self, damping: f32) -> Self {
        self.gravity_damping = damping;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_sweep_workers(mut self, workers: usize) -> Self {
        self.sweep_workers = workers;
        self
    }

    pub fn with_parallel_sweep(mut self, enabled: bool) -> Self {
        self.parallel_sweep = enabled;
        self
    }

    /// Rejects settings the fixed-step loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.fixed_time_step.is_finite() || self.fixed_time_step <= 0.0 {
            return Err(PhysicsError::InvalidTimeStep(self.fixed_time_step));
        }
        Ok(())
    }
}

/// Default gravity as a vector.
pub fn default_gravity() -> Vec3 {
    Vec3::from_slice(&DEFAULT_GRAVITY)
}
