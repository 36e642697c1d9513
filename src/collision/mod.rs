pub mod aabb;
pub mod events;
pub mod manifold;
pub mod sat;
pub mod spatial_hash;

// Re-export key types
pub use aabb::AABB;
pub use events::{CollisionEvent, CollisionEventSink, NullSink};
pub use manifold::CollisionManifold;
pub use sat::SatSolver;
pub use spatial_hash::{CellKey, SpatialHash};
