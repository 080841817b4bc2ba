//! Utility helpers: generational arena, scoped timers, math extensions, step profiling.

pub mod allocator;
pub mod logging;
pub mod math;
pub mod profiling;

pub use allocator::{Arena, ObjectId};
pub use profiling::StepProfile;
