//! Vertical strips of the world, one per worker.

use crate::collision::AABB;
use serde::{Deserialize, Serialize};

/// Half-open x interval `[min_x, max_x)`; a missing end is unbounded.
///
/// A worker resolves a pair only when the pair's anchor (the larger of the two
/// left edges) falls in its range. Neighbouring strips' ranges tile the x axis, so
/// every pair has exactly one owner even when both objects reach two workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnedRange {
    pub min_x: Option<f64>,
    pub max_x: Option<f64>,
}

impl OwnedRange {
    /// Owns every x.
    pub const UNBOUNDED: Self = Self {
        min_x: None,
        max_x: None,
    };

    pub fn new(min_x: Option<f64>, max_x: Option<f64>) -> Self {
        Self { min_x, max_x }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min_x.is_none() && self.max_x.is_none()
    }

    pub fn contains(&self, x: f64) -> bool {
        self.min_x.map_or(true, |lo| x >= lo) && self.max_x.map_or(true, |hi| x < hi)
    }
}

/// Anchor used to assign a colliding pair to one strip: the larger left edge.
///
/// For overlapping bounds this point lies inside both, so both objects reach the
/// worker whose owned range holds it.
pub fn pair_anchor(a: &AABB, b: &AABB) -> f64 {
    a.min.x.max(b.min.x)
}

/// `count` strips dividing the camera's view width evenly. Each strip is widened by
/// `margin` on both sides, and the outermost strips run to infinity so that every
/// object falls in at least one of them.
#[derive(Debug, Clone, PartialEq)]
pub struct StripLayout {
    // (min_x, max_x) per strip, margin included.
    strips: Vec<(f64, f64)>,
    // Pair ownership per strip, margin excluded.
    owned: Vec<OwnedRange>,
}

impl StripLayout {
    pub fn new(view: &AABB, count: usize, margin: f64) -> Self {
        let count = count.max(1);
        let width = view.width() / count as f64;
        let owned: Vec<OwnedRange> = (0..count)
            .map(|i| {
                let lo = (i > 0).then(|| view.min.x + width * i as f64);
                let hi = (i + 1 < count).then(|| view.min.x + width * (i + 1) as f64);
                OwnedRange::new(lo, hi)
            })
            .collect();
        let strips = owned
            .iter()
            .map(|range| {
                (
                    range.min_x.map_or(f64::NEG_INFINITY, |lo| lo - margin),
                    range.max_x.map_or(f64::INFINITY, |hi| hi + margin),
                )
            })
            .collect();
        Self { strips, owned }
    }

    pub fn len(&self) -> usize {
        self.strips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }

    /// Horizontal extent of strip `index`.
    pub fn strip(&self, index: usize) -> Option<(f64, f64)> {
        self.strips.get(index).copied()
    }

    /// Range of pair anchors strip `index` is responsible for.
    pub fn owned_range(&self, index: usize) -> Option<OwnedRange> {
        self.owned.get(index).copied()
    }

    /// Indices of every strip `bounds` touches. Edges count as touching.
    pub fn owners<'a>(&'a self, bounds: &AABB) -> impl Iterator<Item = usize> + 'a {
        let (min_x, max_x) = (bounds.min.x, bounds.max.x);
        self.strips
            .iter()
            .enumerate()
            .filter(move |&(_, &(lo, hi))| min_x <= hi && max_x >= lo)
            .map(|(i, _)| i)
    }
}
