pub mod polygon;

pub use polygon::Polygon;

use crate::collision::AABB;
use crate::math::{Transform, Vec2};
use serde::{Deserialize, Serialize};

/// World-space image of a convex polygon: vertices, center of mass and bounds, kept in sync.
///
/// Rebuilt from a local [`Polygon`] with [`Shape::rebuild`] when the owner rotates, or
/// shifted with [`Shape::translate`] when it only moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    vertices: Vec<Vec2>,
    center_of_mass: Vec2,
    bounds: AABB,
}

impl Shape {
    pub fn from_polygon(polygon: &Polygon, transform: Transform) -> Self {
        let mut shape = Shape {
            vertices: Vec::with_capacity(polygon.vertices().len()),
            center_of_mass: Vec2::ZERO,
            bounds: AABB::new(Vec2::ZERO, Vec2::ZERO),
        };
        shape.rebuild(polygon, transform);
        shape
    }

    /// Recomputes the world-space cache from `polygon` placed at `transform`.
    pub fn rebuild(&mut self, polygon: &Polygon, transform: Transform) {
        transform.apply_all(polygon.vertices(), &mut self.vertices);
        self.center_of_mass = transform.apply(polygon.calculate_centroid());
        // Polygon::new guarantees at least three vertices.
        if let Some(bounds) = AABB::from_points(&self.vertices) {
            self.bounds = bounds;
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        for v in &mut self.vertices {
            *v += delta;
        }
        self.center_of_mass += delta;
        self.bounds.translate(delta);
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn center_of_mass(&self) -> Vec2 {
        self.center_of_mass
    }

    pub fn bounds(&self) -> AABB {
        self.bounds
    }
}
