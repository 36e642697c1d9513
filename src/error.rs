//! Error type for configuration-time failures.
//!
//! Nothing on the per-step path returns these: separated pairs, zero inverse mass and
//! unregistered objects are handled by early returns.

use thiserror::Error;

/// Errors raised while building or configuring the collision subsystem.
#[derive(Debug, Error)]
pub enum CollisionError {
    /// Spatial hash cell size must be a finite, strictly positive number.
    #[error("invalid cell size {0}: must be a finite number greater than zero")]
    InvalidCellSize(f64),
    /// A convex polygon needs at least three vertices.
    #[error("malformed polygon: {vertices} vertices, at least 3 required")]
    MalformedPolygon { vertices: usize },
    /// Any other out-of-range configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Configuration JSON could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
    /// The OS refused to start a worker thread.
    #[error("failed to spawn collision worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CollisionError>;
