//! Collision detection: support shapes, GJK/EPA narrow phase and the one-axis sweep.

pub mod broadphase;
pub mod narrowphase;
pub mod polytope;
pub mod simplex;
pub mod support;

pub use broadphase::{CandidatePair, SweepAndPrune, SweepEdge};
pub use narrowphase::{EPAAlgorithm, EpaResult, GJKAlgorithm, NarrowPhase, Penetration};
pub use polytope::{Face, Polytope};
pub use simplex::{Simplex, SupportPoint};
pub use support::{ColliderView, PlacedShape, SphereInfo, SupportShape};
