//! Tunables for the collision subsystem, loadable from JSON.

use crate::error::{CollisionError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How narrow-phase work is spread across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerMode {
    /// Everything runs on the caller's thread.
    #[default]
    Disabled,
    /// One worker per available hardware thread, at least one.
    Auto,
    /// Exactly this many workers.
    Fixed(usize),
}

impl WorkerMode {
    /// Number of workers to start, `None` when disabled.
    pub fn worker_count(self) -> Option<usize> {
        match self {
            WorkerMode::Disabled => None,
            WorkerMode::Auto => Some(
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1),
            ),
            WorkerMode::Fixed(n) => Some(n.max(1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Spatial hash cell edge, world units.
    pub cell_size: f64,
    /// Extra ring of cells every object is also indexed in.
    pub overflow: u32,
    /// Broad+narrow passes per step on the caller's thread.
    pub iterations: usize,
    /// Broad+narrow passes per step inside each worker.
    pub worker_iterations: usize,
    pub workers: WorkerMode,
    /// How long a step waits for worker replies before carrying positions forward.
    pub worker_timeout_ms: u64,
    /// Horizontal widening of each worker strip before ownership tests.
    pub strip_margin: f64,
    /// Widening applied to the SAT bounding-box pre-rejection.
    pub aabb_tolerance: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            cell_size: 64.0,
            overflow: 0,
            iterations: 2,
            worker_iterations: 10,
            workers: WorkerMode::Disabled,
            worker_timeout_ms: 50,
            strip_margin: 64.0,
            aabb_tolerance: 1.0,
        }
    }
}

impl CollisionConfig {
    /// Parses and validates a JSON document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(CollisionError::InvalidCellSize(self.cell_size));
        }
        if self.iterations == 0 || self.worker_iterations == 0 {
            return Err(CollisionError::InvalidConfig(
                "iteration counts must be at least 1".into(),
            ));
        }
        if self.workers == WorkerMode::Fixed(0) {
            return Err(CollisionError::InvalidConfig(
                "fixed worker count must be at least 1".into(),
            ));
        }
        if !(self.strip_margin.is_finite() && self.strip_margin >= 0.0) {
            return Err(CollisionError::InvalidConfig(format!(
                "strip_margin must be finite and non-negative, got {}",
                self.strip_margin
            )));
        }
        if !(self.aabb_tolerance.is_finite() && self.aabb_tolerance >= 0.0) {
            return Err(CollisionError::InvalidConfig(format!(
                "aabb_tolerance must be finite and non-negative, got {}",
                self.aabb_tolerance
            )));
        }
        Ok(())
    }

    pub fn worker_timeout(&self) -> Duration {
        Duration::from_millis(self.worker_timeout_ms)
    }

    /// The configuration a worker runs its private pipeline with.
    pub fn for_worker(&self) -> Self {
        Self {
            iterations: self.worker_iterations,
            workers: WorkerMode::Disabled,
            ..self.clone()
        }
    }
}
