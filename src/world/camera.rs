use crate::collision::AABB;
use crate::math::Vec2;

/// The visible world rectangle. Only its width matters here: it sizes the worker strips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub bounds: AABB,
}

impl Camera {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            bounds: AABB::new(min, max),
        }
    }

    /// Camera of the given view size centred on `center`.
    pub fn centered(center: Vec2, width: f64, height: f64) -> Self {
        let half = Vec2::new(width / 2.0, height / 2.0);
        Self::new(center - half, center + half)
    }

    pub fn view_width(&self) -> f64 {
        self.bounds.width()
    }
}
