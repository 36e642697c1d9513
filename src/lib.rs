//! 2D collision detection and positional resolution for convex polygons.
//!
//! A uniform spatial hash supplies candidate pairs, a SAT solver finds the minimum
//! translation vector, and the [`CollisionManager`] pushes overlapping bodies apart by
//! inverse mass. The narrow phase can optionally run on a pool of worker threads, each
//! owning a vertical strip of the camera view.

pub mod collision;
pub mod config;
pub mod error;
pub mod math;
pub mod objects;
pub mod shapes;
pub mod workers;
pub mod world;

// Re-export key types for easier use
pub use collision::{
    CellKey, CollisionEvent, CollisionEventSink, CollisionManifold, NullSink, SatSolver,
    SpatialHash, AABB,
};
pub use config::{CollisionConfig, WorkerMode};
pub use error::{CollisionError, Result};
pub use math::{Transform, Vec2};
pub use objects::{Body, Collidable, Collider, CollisionTarget, ObjectId, RigidBody};
pub use shapes::{Polygon, Shape};
pub use workers::WorkerPool;
pub use world::{Camera, CollisionManager, StepStats};
