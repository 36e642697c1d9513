//! Separating Axis Theorem narrow phase for convex polygons.

use super::manifold::CollisionManifold;
use crate::math::vec2::Vec2;
use crate::objects::Collidable;

/// Axes shorter than this come from zero-length edges and are skipped.
const DEGENERATE_AXIS_EPSILON: f64 = 1e-12;

/// Working values reused across calls so the hot loop never allocates.
#[derive(Debug, Default, Clone, Copy)]
struct Scratch {
    axis: Vec2,
    best_axis: Vec2,
    best_overlap: f64,
    center: Vec2,
}

/// Narrow-phase solver. One instance per thread; `test_collision` takes `&mut self`
/// only for its scratch state.
#[derive(Debug, Clone)]
pub struct SatSolver {
    aabb_tolerance: f64,
    scratch: Scratch,
}

impl Default for SatSolver {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Projects a vertex set onto an axis and returns the min/max interval.
fn project(vertices: &[Vec2], axis: Vec2) -> (f64, f64) {
    let mut min_proj = f64::INFINITY;
    let mut max_proj = f64::NEG_INFINITY;
    for v in vertices {
        let p = v.dot(axis);
        min_proj = min_proj.min(p);
        max_proj = max_proj.max(p);
    }
    (min_proj, max_proj)
}

impl SatSolver {
    /// `aabb_tolerance` widens the cheap bounding-box rejection test.
    pub fn new(aabb_tolerance: f64) -> Self {
        Self {
            aabb_tolerance,
            scratch: Scratch::default(),
        }
    }

    pub fn aabb_tolerance(&self) -> f64 {
        self.aabb_tolerance
    }

    /// Tests two collidables. The returned normal points from `a` towards `b`.
    ///
    /// Returns a non-colliding record without touching any axis when the objects are the
    /// same, either has collisions disabled, or their (widened) bounds do not overlap.
    pub fn test_collision<A, B>(&mut self, a: &A, b: &B) -> CollisionManifold
    where
        A: Collidable + ?Sized,
        B: Collidable + ?Sized,
    {
        let (id_a, id_b) = (a.id(), b.id());
        let not_colliding = CollisionManifold::separated(id_a, id_b);

        if id_a == id_b {
            return not_colliding;
        }
        let enabled = |c: Option<&crate::objects::Collider>| c.is_some_and(|c| !c.disable_collisions);
        if !enabled(a.collider()) || !enabled(b.collider()) {
            return not_colliding;
        }
        if !a.bounds().expanded(self.aabb_tolerance).overlaps(&b.bounds()) {
            return not_colliding;
        }

        match self.test_polygons(
            a.vertices(),
            b.vertices(),
            a.center_of_mass(),
            b.center_of_mass(),
        ) {
            Some((normal, overlap)) => CollisionManifold {
                object_a: id_a,
                object_b: id_b,
                collided: true,
                normal,
                tangent: normal.perpendicular(),
                overlap,
                penetration: normal * overlap,
            },
            None => not_colliding,
        }
    }

    /// Raw SAT on two world-space vertex lists. Returns `(normal, overlap)` with the normal
    /// oriented from `center_a` towards `center_b`, or `None` if a separating axis exists.
    ///
    /// Edge `i` of A is tested before edge `i` of B, and the loop runs to the larger edge
    /// count. The first axis reaching the smallest overlap wins ties.
    pub fn test_polygons(
        &mut self,
        verts_a: &[Vec2],
        verts_b: &[Vec2],
        center_a: Vec2,
        center_b: Vec2,
    ) -> Option<(Vec2, f64)> {
        if verts_a.len() < 2 || verts_b.len() < 2 {
            return None;
        }

        let s = &mut self.scratch;
        s.best_overlap = f64::INFINITY;
        s.best_axis = Vec2::ZERO;

        let (len_a, len_b) = (verts_a.len(), verts_b.len());
        for i in 0..len_a.max(len_b) {
            for (verts, len) in [(verts_a, len_a), (verts_b, len_b)] {
                if i >= len {
                    continue;
                }
                let p1 = verts[i];
                let p2 = verts[(i + 1) % len];
                s.axis = (p2 - p1).perpendicular();
                let mag_sq = s.axis.magnitude_squared();
                if mag_sq < DEGENERATE_AXIS_EPSILON {
                    continue;
                }
                s.axis /= mag_sq.sqrt();

                let (min_a, max_a) = project(verts_a, s.axis);
                let (min_b, max_b) = project(verts_b, s.axis);

                let overlap = if min_a > max_b || min_b > max_a {
                    0.0
                } else {
                    (max_b - min_a).min(max_a - min_b)
                };

                // Separating axis found, no collision
                if overlap == 0.0 {
                    return None;
                }

                if overlap.abs() < s.best_overlap {
                    s.best_overlap = overlap.abs();
                    s.best_axis = s.axis;
                }
            }
        }

        // Every edge was degenerate.
        if !s.best_overlap.is_finite() {
            return None;
        }

        // Make the normal point from A towards B.
        s.center = center_b - center_a;
        if s.center.dot(s.best_axis) < 0.0 {
            s.best_axis = -s.best_axis;
        }
        Some((s.best_axis, s.best_overlap))
    }
}
