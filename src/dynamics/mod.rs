//! Fixed-step integration and collision response.

pub mod integrator;
pub mod resolver;

pub use integrator::Integrator;
pub use resolver::{CollisionEvent, Resolver};
