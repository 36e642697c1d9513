//! Strip-partitioned narrow phase on a pool of threads.
//!
//! The coordinator copies each object into a [`snapshot::ObjectSnapshot`], sends every
//! worker the snapshots overlapping its strip, and applies the returned center-of-mass
//! deltas. Every worker also gets the x range of pair anchors it owns, so a pair whose
//! objects reach two workers is resolved by one of them only. Nothing is shared between
//! threads except the channel payloads.

pub mod partition;
pub mod pool;
pub mod snapshot;
pub mod worker;

pub use partition::{OwnedRange, StripLayout};
pub use pool::{WorkerBatch, WorkerPool};
pub use snapshot::{Correction, ObjectSnapshot, WorkerReply, WorkerRequest};
pub use worker::CollisionWorker;
