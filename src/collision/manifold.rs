use crate::math::vec2::Vec2;
use crate::objects::ObjectId;

/// Result of one narrow-phase test between two objects. Transient: built, filtered,
/// reported and applied within a single pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionManifold {
    pub object_a: ObjectId,
    pub object_b: ObjectId,
    pub collided: bool,
    /// Unit MTV axis, pointing from A towards B.
    pub normal: Vec2,
    pub tangent: Vec2,
    /// Penetration depth along `normal`, never negative.
    pub overlap: f64,
    /// `normal * overlap`.
    pub penetration: Vec2,
}

impl CollisionManifold {
    /// A "no collision" record for the given pair.
    pub fn separated(object_a: ObjectId, object_b: ObjectId) -> Self {
        Self {
            object_a,
            object_b,
            collided: false,
            normal: Vec2::ZERO,
            tangent: Vec2::ZERO,
            overlap: 0.0,
            penetration: Vec2::ZERO,
        }
    }
}
