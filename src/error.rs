//! Error types surfaced by the engine.

use thiserror::Error;

use crate::utils::allocator::ObjectId;

/// Failures that abort a query or a simulation step.
///
/// Degenerate geometry is never reported here: GJK/EPA corner cases resolve to
/// "no collision" or a best-effort translation vector instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("object {0:?} does not exist")]
    UnknownObject(ObjectId),

    #[error("object {0:?} has no transform")]
    MissingTransform(ObjectId),

    #[error("object {0:?} has no collider")]
    MissingCollider(ObjectId),

    #[error("object {0:?} has no rigid body")]
    MissingRigidBody(ObjectId),

    #[error("parenting {child:?} under {parent:?} would create a cycle")]
    ParentCycle { child: ObjectId, parent: ObjectId },

    #[error("invalid fixed time step: {0}")]
    InvalidTimeStep(f32),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
