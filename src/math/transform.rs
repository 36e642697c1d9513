use super::vec2::Vec2;
use serde::{Deserialize, Serialize};

/// Rigid placement (rotation about the local origin, then translation) used to bring a
/// polygon's local-space vertices into world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: f64, // radians
}

impl Transform {
    pub fn new(position: Vec2, rotation: f64) -> Self {
        Self { position, rotation }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec2) -> Self {
        Self::new(position, 0.0)
    }

    /// Local → world.
    pub fn apply(self, point: Vec2) -> Vec2 {
        point.rotate(self.rotation) + self.position
    }

    /// World → local.
    pub fn apply_inverse(self, point: Vec2) -> Vec2 {
        (point - self.position).rotate(-self.rotation)
    }

    /// Writes the world-space image of `local` into `out`, reusing its allocation.
    pub fn apply_all(self, local: &[Vec2], out: &mut Vec<Vec2>) {
        let (sin_a, cos_a) = self.rotation.sin_cos();
        out.clear();
        out.extend(local.iter().map(|p| {
            Vec2::new(
                p.x * cos_a - p.y * sin_a + self.position.x,
                p.x * sin_a + p.y * cos_a + self.position.y,
            )
        }));
    }
}
