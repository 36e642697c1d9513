//! Plain-data copies of collidables and the messages exchanged with workers.

use crate::collision::{CollisionEvent, AABB};
use crate::math::Vec2;
use super::partition::OwnedRange;
use crate::objects::{Collidable, Collider, ObjectId, RigidBody};
use crate::world::StepStats;
use serde::{Deserialize, Serialize};

/// Owned copy of everything the narrow phase reads from a [`Collidable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub id: ObjectId,
    pub tag: String,
    pub position: Vec2,
    pub movement: Vec2,
    pub vertices: Vec<Vec2>,
    pub bounds: AABB,
    pub center_of_mass: Vec2,
    pub rigid_body: RigidBody,
    pub collider: Option<Collider>,
}

impl ObjectSnapshot {
    pub fn capture<C: Collidable + ?Sized>(object: &C) -> Self {
        Self {
            id: object.id(),
            tag: object.tag().to_owned(),
            position: object.position(),
            movement: object.movement(),
            vertices: object.vertices().to_vec(),
            bounds: object.bounds(),
            center_of_mass: object.center_of_mass(),
            rigid_body: *object.rigid_body(),
            collider: object.collider().cloned(),
        }
    }
}

impl Collidable for ObjectSnapshot {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn tag(&self) -> &str {
        &self.tag
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    fn bounds(&self) -> AABB {
        self.bounds
    }

    fn center_of_mass(&self) -> Vec2 {
        self.center_of_mass
    }

    fn rigid_body(&self) -> &RigidBody {
        &self.rigid_body
    }

    fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    fn movement(&self) -> Vec2 {
        self.movement
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
        self.center_of_mass += delta;
        self.bounds.translate(delta);
        for v in &mut self.vertices {
            *v += delta;
        }
    }
}

/// One step's batch for one worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub step: u64,
    pub worker: usize,
    /// Pairs whose anchor falls outside this range belong to another worker.
    pub region: OwnedRange,
    pub objects: Vec<ObjectSnapshot>,
}

/// Final center of mass of one object after the worker's passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub id: ObjectId,
    pub center_of_mass: Vec2,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerReply {
    pub step: u64,
    pub worker: usize,
    pub corrections: Vec<Correction>,
    pub events: Vec<CollisionEvent>,
    pub stats: StepStats,
}

impl WorkerReply {
    /// Reply for a batch with nothing in it.
    pub fn empty(step: u64, worker: usize) -> Self {
        Self {
            step,
            worker,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Body;
    use crate::shapes::Polygon;

    fn sample() -> Body {
        Body::new(7, Polygon::rectangle(4.0, 2.0).unwrap(), Vec2::new(10.0, 5.0))
            .with_tag("crate")
            .with_rigid_body(RigidBody::new(2.0))
    }

    #[test]
    fn test_capture_copies_collidable_view() {
        let body = sample();
        let snap = ObjectSnapshot::capture(&body);
        assert_eq!(snap.id, ObjectId(7));
        assert_eq!(snap.tag(), "crate");
        assert_eq!(snap.vertices(), body.vertices());
        assert_eq!(snap.bounds(), body.bounds());
        assert_eq!(snap.rigid_body().inverse_mass, 0.5);
        assert!(snap.collider().is_some());
    }

    #[test]
    fn test_translate_moves_everything() {
        let mut snap = ObjectSnapshot::capture(&sample());
        snap.translate(Vec2::new(1.0, -1.0));
        assert_eq!(snap.center_of_mass, Vec2::new(11.0, 4.0));
        assert_eq!(snap.bounds.min, Vec2::new(9.0, 3.0));
        assert_eq!(snap.vertices[0] - snap.position, sample().vertices()[0] - sample().position());
    }

    #[test]
    fn test_request_survives_json() {
        let request = WorkerRequest {
            step: 3,
            worker: 1,
            region: OwnedRange::new(Some(100.0), None),
            objects: vec![ObjectSnapshot::capture(&sample())],
        };
        let text = serde_json::to_string(&request).unwrap();
        let back: WorkerRequest = serde_json::from_str(&text).unwrap();
        assert_eq!(back.step, 3);
        assert_eq!(back.region, request.region);
        assert_eq!(back.objects, request.objects);
    }
}
