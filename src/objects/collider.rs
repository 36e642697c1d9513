//! Per-object collision filtering configuration.

use super::ObjectId;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Something a filter set can name: every object carrying a type tag, or one object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionTarget {
    Tag(String),
    Object(ObjectId),
}

impl From<ObjectId> for CollisionTarget {
    fn from(id: ObjectId) -> Self {
        CollisionTarget::Object(id)
    }
}

impl From<&str> for CollisionTarget {
    fn from(tag: &str) -> Self {
        CollisionTarget::Tag(tag.to_string())
    }
}

/// Collider settings. An object without a collider is never registered with the manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub disable_collisions: bool,
    /// Trigger colliders report collisions but are never separated.
    pub trigger: bool,
    pub ignored_collisions: FxHashSet<CollisionTarget>,
    /// Empty means "collides with everything".
    pub collides_only_with: FxHashSet<CollisionTarget>,
    pub trigger_only_collisions: FxHashSet<CollisionTarget>,
}

fn names(set: &FxHashSet<CollisionTarget>, tag: &str, id: ObjectId) -> bool {
    if set.is_empty() {
        return false;
    }
    // Avoid allocating a String for the tag lookup on the hot path.
    set.contains(&CollisionTarget::Object(id))
        || set
            .iter()
            .any(|t| matches!(t, CollisionTarget::Tag(t) if t == tag))
}

impl Collider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger() -> Self {
        Self {
            trigger: true,
            ..Self::default()
        }
    }

    pub fn ignore(mut self, target: impl Into<CollisionTarget>) -> Self {
        self.ignored_collisions.insert(target.into());
        self
    }

    pub fn only_with(mut self, target: impl Into<CollisionTarget>) -> Self {
        self.collides_only_with.insert(target.into());
        self
    }

    pub fn trigger_only_with(mut self, target: impl Into<CollisionTarget>) -> Self {
        self.trigger_only_collisions.insert(target.into());
        self
    }

    /// True if the ignore list names the other object.
    pub fn ignores(&self, tag: &str, id: ObjectId) -> bool {
        names(&self.ignored_collisions, tag, id)
    }

    /// False only when an allow-list is declared and it does not name the other object.
    pub fn allows(&self, tag: &str, id: ObjectId) -> bool {
        self.collides_only_with.is_empty() || names(&self.collides_only_with, tag, id)
    }

    pub fn is_trigger_with(&self, tag: &str, id: ObjectId) -> bool {
        self.trigger || names(&self.trigger_only_collisions, tag, id)
    }
}

/// Outcome of running a candidate pair through both colliders' filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairFilter {
    /// Ignored or outside an allow-list: no event, no separation.
    Drop,
    /// Report the collision but leave positions alone.
    TriggerOnly,
    /// Report and separate.
    Resolve,
}

/// Applies the filter precedence: ignore lists, then allow-lists, then trigger rules.
/// The first rule that matches decides.
pub fn filter_pair(
    a: &Collider,
    a_tag: &str,
    a_id: ObjectId,
    b: &Collider,
    b_tag: &str,
    b_id: ObjectId,
) -> PairFilter {
    if a.ignores(b_tag, b_id) || b.ignores(a_tag, a_id) {
        return PairFilter::Drop;
    }
    if !a.allows(b_tag, b_id) || !b.allows(a_tag, a_id) {
        return PairFilter::Drop;
    }
    if a.is_trigger_with(b_tag, b_id) || b.is_trigger_with(a_tag, a_id) {
        return PairFilter::TriggerOnly;
    }
    PairFilter::Resolve
}
