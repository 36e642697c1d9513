pub mod camera;
pub mod manager;

pub use camera::Camera;
pub use manager::{separation_deltas, CollisionManager, StepStats};
