use super::{Collidable, Collider, ObjectId, RigidBody};
use crate::collision::{CollisionEvent, AABB};
use crate::math::{Transform, Vec2};
use crate::shapes::{Polygon, Shape};

/// A plain convex-polygon object: the default [`Collidable`] used by the demo, the
/// benchmarks and the tests. Game code with its own entity type implements the trait
/// directly instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    id: ObjectId,
    tag: String,
    polygon: Polygon,
    transform: Transform,
    shape: Shape,
    pub rigid_body: RigidBody,
    pub collider: Option<Collider>,
    pub movement: Vec2,
    destroyed: bool,
    // Collision events delivered to this body since the last drain.
    inbox: Vec<CollisionEvent>,
}

impl Body {
    /// Dynamic unit-mass body with a default collider, polygon origin placed at `position`.
    pub fn new(id: impl Into<ObjectId>, polygon: Polygon, position: Vec2) -> Self {
        let transform = Transform::from_position(position);
        let shape = Shape::from_polygon(&polygon, transform);
        Self {
            id: id.into(),
            tag: String::new(),
            polygon,
            transform,
            shape,
            rigid_body: RigidBody::default(),
            collider: Some(Collider::default()),
            movement: Vec2::ZERO,
            destroyed: false,
            inbox: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_rigid_body(mut self, rigid_body: RigidBody) -> Self {
        self.rigid_body = rigid_body;
        self
    }

    pub fn with_collider(mut self, collider: Option<Collider>) -> Self {
        self.collider = collider;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.set_rotation(rotation);
        self
    }

    pub fn rotation(&self) -> f64 {
        self.transform.rotation
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
        self.shape.rebuild(&self.polygon, self.transform);
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.transform.rotation = rotation;
        self.shape.rebuild(&self.polygon, self.transform);
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    /// Events this body received, oldest first.
    pub fn events(&self) -> &[CollisionEvent] {
        &self.inbox
    }

    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.inbox)
    }
}

impl Collidable for Body {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn tag(&self) -> &str {
        &self.tag
    }

    fn position(&self) -> Vec2 {
        self.transform.position
    }

    fn vertices(&self) -> &[Vec2] {
        self.shape.vertices()
    }

    fn bounds(&self) -> AABB {
        self.shape.bounds()
    }

    fn center_of_mass(&self) -> Vec2 {
        self.shape.center_of_mass()
    }

    fn rigid_body(&self) -> &RigidBody {
        &self.rigid_body
    }

    fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn movement(&self) -> Vec2 {
        self.movement
    }

    fn translate(&mut self, delta: Vec2) {
        self.transform.position += delta;
        self.shape.translate(delta);
    }

    fn on_collision(&mut self, event: &CollisionEvent) {
        self.inbox.push(*event);
    }
}
