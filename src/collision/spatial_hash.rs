// Implements a dynamic uniform spatial hash for broadphase collision detection.

use crate::collision::AABB;
use crate::error::{CollisionError, Result};
use crate::objects::{Collidable, ObjectId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use tracing::debug;

/// Integer coordinates of one grid cell.
///
/// Displays as the canonical `"ix,iy"` string; equality and hashing are on the integer
/// pair, so equal floored coordinates always land in the same bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub x: i64,
    pub y: i64,
}

impl CellKey {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Cells an indexed object occupies, plus the bounds they were derived from so the
/// table can be rebuilt when the cell size or overflow changes.
#[derive(Debug, Clone)]
struct Membership {
    cells: Vec<CellKey>,
    bounds: AABB,
}

/// A uniform grid of unbounded extent keyed by [`CellKey`].
///
/// Each object is stored in every cell its bounds touch, widened by `overflow` cells on
/// each side so near neighbours show up one cell before their bounds actually meet.
/// Empty buckets are pruned immediately.
#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f64,
    inv_cell_size: f64, // 1.0 / cell_size, cached for performance
    overflow: u32,
    table: FxHashMap<CellKey, FxHashSet<ObjectId>>,
    memberships: FxHashMap<ObjectId, Membership>,
}

fn validate_cell_size(cell_size: f64) -> Result<f64> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(cell_size)
    } else {
        Err(CollisionError::InvalidCellSize(cell_size))
    }
}

impl SpatialHash {
    /// Creates an empty hash. Fails if `cell_size` is not a finite positive number.
    pub fn new(cell_size: f64) -> Result<Self> {
        Self::with_overflow(cell_size, 0)
    }

    pub fn with_overflow(cell_size: f64, overflow: u32) -> Result<Self> {
        let cell_size = validate_cell_size(cell_size)?;
        debug!(cell_size, overflow, "creating spatial hash");
        Ok(SpatialHash {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            overflow,
            table: FxHashMap::default(),
            memberships: FxHashMap::default(),
        })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn overflow(&self) -> u32 {
        self.overflow
    }

    /// Changes the cell size and re-indexes every object from its recorded bounds.
    pub fn set_cell_size(&mut self, cell_size: f64) -> Result<()> {
        let cell_size = validate_cell_size(cell_size)?;
        debug!(from = self.cell_size, to = cell_size, "spatial hash cell size changed");
        self.cell_size = cell_size;
        self.inv_cell_size = 1.0 / cell_size;
        self.reindex();
        Ok(())
    }

    pub fn set_overflow(&mut self, overflow: u32) {
        if overflow != self.overflow {
            self.overflow = overflow;
            self.reindex();
        }
    }

    fn reindex(&mut self) {
        let entries: Vec<(ObjectId, AABB)> = self
            .memberships
            .iter()
            .map(|(id, m)| (*id, m.bounds))
            .collect();
        self.table.clear();
        self.memberships.clear();
        for (id, bounds) in entries {
            self.insert(id, bounds);
        }
    }

    // --- Helper Methods ---

    #[inline]
    fn cell_coord(&self, value: f64) -> i64 {
        (value * self.inv_cell_size).floor() as i64
    }

    /// Key of the cell containing the world point `(x, y)`.
    pub fn get_hash_from_position(&self, x: f64, y: f64) -> CellKey {
        CellKey::new(self.cell_coord(x), self.cell_coord(y))
    }

    /// Every cell `bounds` touches, widened by `overflow` cells, row by row.
    pub fn cells_for_bounds(&self, bounds: &AABB) -> Vec<CellKey> {
        let overflow = i64::from(self.overflow);
        let min = self.get_hash_from_position(bounds.min.x, bounds.min.y);
        let max = self.get_hash_from_position(bounds.max.x, bounds.max.y);
        let (x0, x1) = (min.x.saturating_sub(overflow), max.x.saturating_add(overflow));
        let (y0, y1) = (min.y.saturating_sub(overflow), max.y.saturating_add(overflow));

        let mut cells = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                cells.push(CellKey::new(x, y));
            }
        }
        cells
    }

    // --- Public API Methods ---

    /// Indexes `object` under every cell its current bounds touch.
    /// An object already present is re-indexed rather than duplicated.
    pub fn add<C: Collidable + ?Sized>(&mut self, object: &C) -> &mut Self {
        self.insert(object.id(), object.bounds());
        self
    }

    /// Indexes a raw id/bounds pair. Used by [`SpatialHash::add`].
    pub fn insert(&mut self, id: ObjectId, bounds: AABB) -> &mut Self {
        self.remove(id);
        let cells = self.cells_for_bounds(&bounds);
        for key in &cells {
            self.table.entry(*key).or_default().insert(id);
        }
        self.memberships.insert(id, Membership { cells, bounds });
        self
    }

    /// Removes `object` from every cell it was recorded in. Returns false (and does
    /// nothing) if it was not indexed.
    pub fn delete<C: Collidable + ?Sized>(&mut self, object: &C) -> bool {
        self.remove(object.id())
    }

    /// Id-based form of [`SpatialHash::delete`].
    pub fn remove(&mut self, id: ObjectId) -> bool {
        let Some(membership) = self.memberships.remove(&id) else {
            return false;
        };
        for key in &membership.cells {
            if let Some(bucket) = self.table.get_mut(key) {
                bucket.remove(&id);
                if bucket.is_empty() {
                    self.table.remove(key);
                }
            }
        }
        true
    }

    /// Recomputes `object`'s cells from its current bounds (delete, then add).
    pub fn update<C: Collidable + ?Sized>(&mut self, object: &C) -> &mut Self {
        self.remove(object.id());
        self.add(object)
    }

    /// Distinct objects sharing at least one cell with `object`, itself excluded, sorted
    /// by id. Uses the recorded cells when `object` is indexed, otherwise derives them
    /// from its bounds without touching the table.
    pub fn query<C: Collidable + ?Sized>(&self, object: &C) -> Vec<ObjectId> {
        let id = object.id();
        match self.memberships.get(&id) {
            Some(membership) => self.collect(&membership.cells, id),
            None => self.collect(&self.cells_for_bounds(&object.bounds()), id),
        }
    }

    fn collect(&self, cells: &[CellKey], exclude: ObjectId) -> Vec<ObjectId> {
        let mut found = FxHashSet::default();
        for key in cells {
            if let Some(bucket) = self.table.get(key) {
                found.extend(bucket.iter().copied());
            }
        }
        found.remove(&exclude);
        let mut out: Vec<ObjectId> = found.into_iter().collect();
        out.sort_unstable();
        out
    }

    /// Cells `id` is currently recorded in; `None` means "not indexed".
    pub fn cells_of(&self, id: ObjectId) -> Option<&[CellKey]> {
        self.memberships.get(&id).map(|m| m.cells.as_slice())
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.memberships.contains_key(&id)
    }

    pub fn bucket(&self, key: CellKey) -> Option<&FxHashSet<ObjectId>> {
        self.table.get(&key)
    }

    /// Number of indexed objects.
    pub fn len(&self) -> usize {
        self.memberships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memberships.is_empty()
    }

    /// Number of non-empty buckets.
    pub fn bucket_count(&self) -> usize {
        self.table.len()
    }

    /// Drops one bucket. Its members forget that cell but stay indexed elsewhere; a
    /// member left with no cells is no longer indexed.
    pub fn clear(&mut self, key: CellKey) {
        let Some(bucket) = self.table.remove(&key) else {
            return;
        };
        for id in bucket {
            if let Some(membership) = self.memberships.get_mut(&id) {
                membership.cells.retain(|k| *k != key);
                if membership.cells.is_empty() {
                    self.memberships.remove(&id);
                }
            }
        }
    }

    /// Empties the whole table.
    pub fn clear_all(&mut self) {
        self.table.clear();
        self.memberships.clear();
    }
}
