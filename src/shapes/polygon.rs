use crate::error::{CollisionError, Result};
use crate::math::vec2::Vec2;
use serde::{Deserialize, Serialize};

/// Represents a convex polygon shape defined by its vertices in local space.
/// Vertices should be ordered counter-clockwise (or clockwise, consistently).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

impl Polygon {
    pub const MIN_VERTICES: usize = 3;

    /// Creates a new polygon from a vector of vertices.
    ///
    /// Fails with [`CollisionError::MalformedPolygon`] if fewer than 3 vertices are provided.
    /// Convexity is the caller's responsibility.
    pub fn new(vertices: Vec<Vec2>) -> Result<Self> {
        if vertices.len() < Self::MIN_VERTICES {
            return Err(CollisionError::MalformedPolygon {
                vertices: vertices.len(),
            });
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(CollisionError::InvalidConfig(
                "polygon vertices must be finite".into(),
            ));
        }
        Ok(Polygon { vertices })
    }

    /// Axis-aligned `width` x `height` box centred on the local origin, counter-clockwise.
    pub fn rectangle(width: f64, height: f64) -> Result<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(CollisionError::InvalidConfig(format!(
                "rectangle extents must be positive, got {width}x{height}"
            )));
        }
        let hw = width / 2.0;
        let hh = height / 2.0;
        Self::new(vec![
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ])
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`, counter-clockwise,
    /// first vertex on the +x axis.
    pub fn regular(sides: usize, radius: f64) -> Result<Self> {
        if !(radius > 0.0) {
            return Err(CollisionError::InvalidConfig(format!(
                "regular polygon radius must be positive, got {radius}"
            )));
        }
        let step = std::f64::consts::TAU / sides as f64;
        Self::new(
            (0..sides)
                .map(|i| Vec2::new(radius, 0.0).rotate(step * i as f64))
                .collect(),
        )
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Calculates the area of the polygon using the Shoelace formula.
    pub fn calculate_area(&self) -> f64 {
        let n = self.vertices.len();
        let mut area = 0.0;
        for i in 0..n {
            let v1 = self.vertices[i];
            let v2 = self.vertices[(i + 1) % n];
            area += v1.cross(v2);
        }
        (area / 2.0).abs()
    }

    /// Calculates the centroid (center of mass for uniform density) of the polygon.
    pub fn calculate_centroid(&self) -> Vec2 {
        centroid_of(&self.vertices)
    }

    /// Returns the unit edge normals, one per edge (edge `i` runs from vertex `i` to `i + 1`).
    /// For counter-clockwise winding these point inward; SAT only needs the axis.
    pub fn get_edge_normals(&self) -> Vec<Vec2> {
        let n = self.vertices.len();
        (0..n)
            .map(|i| {
                let edge = self.vertices[(i + 1) % n] - self.vertices[i];
                edge.perpendicular().normalize()
            })
            .collect()
    }
}

/// Area-weighted centroid of a vertex fan. Degenerate (zero-area) input falls back to
/// the vertex average.
pub(crate) fn centroid_of(vertices: &[Vec2]) -> Vec2 {
    let n = vertices.len();
    if n == 0 {
        return Vec2::ZERO;
    }
    let mut centroid = Vec2::ZERO;
    let mut signed_area_sum = 0.0;
    let origin = vertices[0];

    for i in 1..n.saturating_sub(1) {
        let v2 = vertices[i];
        let v3 = vertices[i + 1];
        let triangle_signed_area = (v2 - origin).cross(v3 - origin) / 2.0;
        signed_area_sum += triangle_signed_area;
        centroid += (origin + v2 + v3) / 3.0 * triangle_signed_area;
    }

    if signed_area_sum.abs() < 1e-10 {
        let mut avg = Vec2::ZERO;
        for v in vertices {
            avg += *v;
        }
        avg / n as f64
    } else {
        centroid / signed_area_sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_polygon_new_too_few_vertices() {
        let err = Polygon::new(vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)]).unwrap_err();
        assert!(matches!(err, CollisionError::MalformedPolygon { vertices: 2 }));
    }

    #[test]
    fn test_polygon_rejects_non_finite() {
        let err = Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(f64::NAN, 0.0),
            Vec2::new(0.0, 1.0),
        ])
        .unwrap_err();
        assert!(matches!(err, CollisionError::InvalidConfig(_)));
    }

    #[test]
    fn test_rectangle() {
        let rect = Polygon::rectangle(4.0, 2.0).unwrap();
        assert_eq!(rect.vertices().len(), 4);
        assert!((rect.calculate_area() - 8.0).abs() < EPSILON);
        let c = rect.calculate_centroid();
        assert!(c.x.abs() < EPSILON && c.y.abs() < EPSILON);
        assert!(Polygon::rectangle(0.0, 1.0).is_err());
    }

    #[test]
    fn test_regular() {
        let hex = Polygon::regular(6, 1.0).unwrap();
        assert_eq!(hex.vertices().len(), 6);
        // Regular hexagon area = 3*sqrt(3)/2 * r^2
        assert!((hex.calculate_area() - 3.0 * 3f64.sqrt() / 2.0).abs() < EPSILON);
        assert!(Polygon::regular(2, 1.0).is_err());
    }

    #[test]
    fn test_polygon_centroid_triangle() {
        let polygon = Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(0.0, 3.0),
        ])
        .unwrap();
        let centroid = polygon.calculate_centroid();
        assert!((centroid.x - 1.0).abs() < EPSILON);
        assert!((centroid.y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_polygon_centroid_square_offset() {
        let offset = Vec2::new(10.0, -5.0);
        let polygon = Polygon::new(vec![
            offset + Vec2::new(0.0, 0.0),
            offset + Vec2::new(1.0, 0.0),
            offset + Vec2::new(1.0, 1.0),
            offset + Vec2::new(0.0, 1.0),
        ])
        .unwrap();
        let centroid = polygon.calculate_centroid();
        assert!((centroid.x - 10.5).abs() < EPSILON);
        assert!((centroid.y - -4.5).abs() < EPSILON);
    }

    #[test]
    fn test_edge_normals_are_unit_and_perpendicular() {
        let rect = Polygon::rectangle(2.0, 2.0).unwrap();
        let normals = rect.get_edge_normals();
        assert_eq!(normals.len(), 4);
        let verts = rect.vertices();
        for (i, n) in normals.iter().enumerate() {
            assert!((n.magnitude() - 1.0).abs() < EPSILON);
            let edge = verts[(i + 1) % verts.len()] - verts[i];
            assert!(edge.dot(*n).abs() < EPSILON);
        }
    }
}
