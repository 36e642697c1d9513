use super::{Collider, ObjectId, RigidBody};
use crate::collision::{CollisionEvent, AABB};
use crate::math::Vec2;

/// The narrow view of a scene object the collision subsystem works with.
///
/// `vertices`, `bounds` and `center_of_mass` are world-space and must stay consistent
/// with each other; [`Collidable::translate`] is the only write the subsystem performs.
pub trait Collidable {
    /// Stable key for the registry, the spatial hash and pair de-duplication.
    fn id(&self) -> ObjectId;

    /// Type tag matched by [`super::CollisionTarget::Tag`] filters.
    fn tag(&self) -> &str {
        ""
    }

    fn position(&self) -> Vec2;

    /// Convex polygon, world space, consistent winding.
    fn vertices(&self) -> &[Vec2];

    fn bounds(&self) -> AABB;

    fn center_of_mass(&self) -> Vec2;

    fn rigid_body(&self) -> &RigidBody;

    /// `None` means the object does not take part in collisions at all.
    fn collider(&self) -> Option<&Collider>;

    /// Destroyed objects are lazily dropped from the spatial hash.
    fn is_destroyed(&self) -> bool {
        false
    }

    /// Displacement accumulated by the owning scene this tick. Carried into worker
    /// snapshots untouched.
    fn movement(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// Moves the object (position, vertices, bounds and center of mass) by `delta`.
    fn translate(&mut self, delta: Vec2);

    /// Per-object listener hook, called once per reported pair.
    fn on_collision(&mut self, _event: &CollisionEvent) {}
}
