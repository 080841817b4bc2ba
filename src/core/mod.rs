//! Core data model: transforms, components, objects and edit/run state.

pub mod collider;
pub mod object;
pub mod rigidbody;
pub mod scene;
pub mod state;
pub mod transform;

pub use collider::{Aabb, Collider, ColliderShape, ShapeType};
pub use object::{Component, ComponentKind, ComponentTable, Object};
pub use rigidbody::{BodyState, RigidBody, RigidBodyBuilder};
pub use scene::Scene;
pub use state::{DualState, SimulationMode};
pub use transform::{Transform, TransformValues, WorldTransform};
