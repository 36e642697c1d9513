//! Collision notifications and the sink they are delivered to.
//!
//! The manager owns one [`CollisionEventSink`]; game code decides whether that is a
//! buffer, a channel or nothing at all.

use super::manifold::CollisionManifold;
use crate::math::Vec2;
use crate::objects::ObjectId;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

/// Emitted to both participants and to the sink for a resolved or trigger-only pair.
///
/// At most one event per unordered pair per step, on both the single-threaded and the
/// worker path. The event describes the first pass that found the overlap; later passes
/// in the same step may still separate the pair without reporting it again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub object_a: ObjectId,
    pub object_b: ObjectId,
    pub normal: Vec2,
    pub tangent: Vec2,
    pub overlap: f64,
    pub penetration: Vec2,
    pub collided: bool,
    /// Reported without positional separation.
    pub trigger: bool,
}

impl CollisionEvent {
    pub fn from_manifold(manifold: &CollisionManifold, trigger: bool) -> Self {
        Self {
            object_a: manifold.object_a,
            object_b: manifold.object_b,
            normal: manifold.normal,
            tangent: manifold.tangent,
            overlap: manifold.overlap,
            penetration: manifold.penetration,
            collided: manifold.collided,
            trigger,
        }
    }

    /// True if `id` takes part in this event.
    pub fn involves(&self, id: ObjectId) -> bool {
        self.object_a == id || self.object_b == id
    }
}

/// Receiver for every collision event the manager reports.
pub trait CollisionEventSink {
    fn emit(&mut self, event: &CollisionEvent);
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl CollisionEventSink for NullSink {
    fn emit(&mut self, _event: &CollisionEvent) {}
}

impl CollisionEventSink for Vec<CollisionEvent> {
    fn emit(&mut self, event: &CollisionEvent) {
        self.push(*event);
    }
}

impl<T: CollisionEventSink + ?Sized> CollisionEventSink for Box<T> {
    fn emit(&mut self, event: &CollisionEvent) {
        (**self).emit(event);
    }
}

// A closed receiver is not the collision subsystem's problem; events are notifications.
impl CollisionEventSink for Sender<CollisionEvent> {
    fn emit(&mut self, event: &CollisionEvent) {
        let _ = self.send(*event);
    }
}
