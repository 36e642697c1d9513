use crate::collision::{
    CollisionEvent, CollisionEventSink, CollisionManifold, NullSink, SatSolver, SpatialHash, AABB,
};
use crate::config::{CollisionConfig, WorkerMode};
use crate::error::Result;
use crate::math::vec2::Vec2;
use crate::objects::{filter_pair, Collidable, ObjectId, PairFilter, RigidBody};
use crate::workers::partition::pair_anchor;
use crate::workers::{ObjectSnapshot, OwnedRange, StripLayout, WorkerBatch, WorkerPool};
use crate::world::Camera;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::AddAssign;
use tracing::{debug, instrument, trace};

/// Unordered pair key: `(a, b)` and `(b, a)` map to the same value.
pub(crate) fn pair_key(a: ObjectId, b: ObjectId) -> (ObjectId, ObjectId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Counters for one `check_collisions` / `update` call.
///
/// On the worker path `passes` is the largest pass count any worker ran; the other
/// counters are summed over workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStats {
    pub passes: usize,
    /// Candidate pairs that reached the narrow phase.
    pub pairs_tested: usize,
    pub collisions: usize,
    pub separations: usize,
    pub triggers: usize,
    /// Colliding pairs rejected by ignore or allow lists.
    pub dropped: usize,
    /// Workers that missed their reply deadline this step.
    pub workers_missing: usize,
}

impl AddAssign for StepStats {
    fn add_assign(&mut self, rhs: Self) {
        self.passes += rhs.passes;
        self.pairs_tested += rhs.pairs_tested;
        self.collisions += rhs.collisions;
        self.separations += rhs.separations;
        self.triggers += rhs.triggers;
        self.dropped += rhs.dropped;
        self.workers_missing += rhs.workers_missing;
    }
}

/// Mass-weighted displacements `(delta_a, delta_b)` that remove `penetration`.
///
/// `None` when both sides have zero inverse mass. A static side always gets a zero delta.
pub fn separation_deltas(
    penetration: Vec2,
    body_a: &RigidBody,
    body_b: &RigidBody,
) -> Option<(Vec2, Vec2)> {
    let total_inverse_mass = body_a.inverse_mass + body_b.inverse_mass;
    if total_inverse_mass <= 0.0 {
        return None;
    }
    let delta_a = if body_a.is_static {
        Vec2::ZERO
    } else {
        -penetration * (body_a.inverse_mass / total_inverse_mass)
    };
    let delta_b = if body_b.is_static {
        Vec2::ZERO
    } else {
        penetration * (body_b.inverse_mass / total_inverse_mass)
    };
    Some((delta_a, delta_b))
}

/// Owns the collidable registry and the authoritative spatial hash, and runs the
/// broad phase → narrow phase → filter → dispatch → separate pipeline.
///
/// With workers enabled, [`CollisionManager::update`] hands the narrow phase to a
/// [`WorkerPool`] and folds the returned corrections back in.
pub struct CollisionManager<C, S = NullSink> {
    config: CollisionConfig,
    objects: BTreeMap<ObjectId, C>,
    hash: SpatialHash,
    solver: SatSolver,
    processed_pairs: FxHashSet<(ObjectId, ObjectId)>,
    // Pairs already reported this step.
    reported_pairs: FxHashSet<(ObjectId, ObjectId)>,
    // Only pairs anchored here are resolved. Unbounded outside workers.
    pair_region: OwnedRange,
    // Bounds at the start of the step, for anchoring pairs against `pair_region`.
    anchors: FxHashMap<ObjectId, AABB>,
    // Reused id buffer for the pass loop.
    order: Vec<ObjectId>,
    sink: S,
    pool: Option<WorkerPool>,
    step: u64,
}

impl<C: Collidable> CollisionManager<C, NullSink> {
    /// Manager whose events only reach the objects' own listeners.
    pub fn new(config: CollisionConfig) -> Result<Self> {
        Self::with_sink(config, NullSink)
    }
}

impl<C: Collidable, S: CollisionEventSink> CollisionManager<C, S> {
    /// Validates `config`, builds the hash and, if configured, starts the worker pool.
    pub fn with_sink(config: CollisionConfig, sink: S) -> Result<Self> {
        config.validate()?;
        let hash = SpatialHash::with_overflow(config.cell_size, config.overflow)?;
        let pool = match config.workers.worker_count() {
            Some(count) => Some(WorkerPool::start(count, &config)?),
            None => None,
        };
        Ok(Self {
            solver: SatSolver::new(config.aabb_tolerance),
            config,
            objects: BTreeMap::new(),
            hash,
            processed_pairs: FxHashSet::default(),
            reported_pairs: FxHashSet::default(),
            pair_region: OwnedRange::UNBOUNDED,
            anchors: FxHashMap::default(),
            order: Vec::new(),
            sink,
            pool,
            step: 0,
        })
    }

    /// Runs the worker path on a caller-built pool, whatever `config.workers` says.
    pub fn with_worker_pool(config: CollisionConfig, sink: S, pool: WorkerPool) -> Result<Self> {
        let workers = config.workers;
        let mut manager = Self::with_sink(
            CollisionConfig {
                workers: WorkerMode::Disabled,
                ..config
            },
            sink,
        )?;
        manager.config.workers = workers;
        manager.pool = Some(pool);
        Ok(manager)
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    pub fn hash(&self) -> &SpatialHash {
        &self.hash
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Number of running workers; zero on the single-threaded path.
    pub fn worker_count(&self) -> usize {
        self.pool.as_ref().map_or(0, WorkerPool::len)
    }

    /// Restricts resolution to pairs whose anchor (the larger left edge of the two
    /// bounds at the start of the step) lies in `region`.
    pub(crate) fn set_pair_region(&mut self, region: OwnedRange) {
        self.pair_region = region;
    }

    /// Steps run through [`CollisionManager::update`].
    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&C> {
        self.objects.get(&id)
    }

    /// Mutable access. Bounds changes made here are picked up by the next pass, or
    /// immediately via [`CollisionManager::update_hash`].
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut C> {
        self.objects.get_mut(&id)
    }

    /// Registered objects in id order.
    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.objects.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    /// Registers `object` in the registry and the hash. Objects without a collider, and
    /// ids already registered, are refused and `false` is returned.
    pub fn add(&mut self, object: C) -> bool {
        let id = object.id();
        if object.collider().is_none() {
            trace!(%id, "not registering object without collider");
            return false;
        }
        if self.objects.contains_key(&id) {
            return false;
        }
        self.hash.add(&object);
        self.objects.insert(id, object);
        true
    }

    /// Unregisters `id` from both structures and hands the object back.
    pub fn delete(&mut self, id: ObjectId) -> Option<C> {
        self.hash.remove(id);
        self.objects.remove(&id)
    }

    /// Refreshes one object's cells; a destroyed object is dropped from the hash instead.
    pub fn update_hash(&mut self, id: ObjectId) {
        let Some(object) = self.objects.get(&id) else {
            return;
        };
        if object.is_destroyed() {
            self.hash.remove(id);
        } else {
            self.hash.update(object);
        }
    }

    fn refresh_hash(&mut self) {
        for (id, object) in &self.objects {
            if object.is_destroyed() {
                self.hash.remove(*id);
            } else {
                self.hash.update(object);
            }
        }
    }

    /// Unregisters every object reporting `is_destroyed()` and returns them.
    pub fn remove_destroyed(&mut self) -> Vec<C> {
        let dead: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|(_, o)| o.is_destroyed())
            .map(|(id, _)| *id)
            .collect();
        dead.into_iter().filter_map(|id| self.delete(id)).collect()
    }

    /// Drops every object and empties the hash.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.hash.clear_all();
        self.processed_pairs.clear();
        self.reported_pairs.clear();
        self.anchors.clear();
    }

    /// One simulation tick. Runs the single-threaded pipeline, or the worker pipeline
    /// when a pool is running (strips sized from `camera`).
    #[instrument(skip_all, fields(step = self.step + 1))]
    pub fn update(&mut self, camera: &Camera) -> StepStats {
        self.step += 1;
        if self.pool.is_some() {
            self.run_workers(camera)
        } else {
            self.check_collisions()
        }
    }

    /// Runs `config.iterations` passes of hash refresh → broad phase → narrow phase →
    /// filter → dispatch → separate on the caller's thread.
    ///
    /// A pair still overlapping on a later pass is separated again, but its event is
    /// dispatched only on the first pass that reports it.
    #[instrument(skip_all, fields(objects = self.objects.len()))]
    pub fn check_collisions(&mut self) -> StepStats {
        let mut stats = StepStats::default();
        self.reported_pairs.clear();
        self.anchors.clear();
        if !self.pair_region.is_unbounded() {
            self.anchors
                .extend(self.objects.iter().map(|(id, object)| (*id, object.bounds())));
        }
        for _ in 0..self.config.iterations {
            self.refresh_hash();
            self.run_pass(&mut stats);
            stats.passes += 1;
        }
        debug!(
            pairs = stats.pairs_tested,
            collisions = stats.collisions,
            separations = stats.separations,
            triggers = stats.triggers,
            "collision step finished"
        );
        stats
    }

    fn run_pass(&mut self, stats: &mut StepStats) {
        self.processed_pairs.clear();
        let mut order = std::mem::take(&mut self.order);
        order.clear();
        order.extend(self.objects.keys().copied());

        for &id in &order {
            let candidates = match self.objects.get(&id) {
                Some(object) if !object.is_destroyed() => self.hash.query(object),
                _ => continue,
            };

            for other in candidates {
                if !self.processed_pairs.insert(pair_key(id, other)) {
                    continue;
                }
                let (Some(a), Some(b)) = (self.objects.get(&id), self.objects.get(&other)) else {
                    continue;
                };
                if b.is_destroyed() || !self.owns_pair(id, other) {
                    continue;
                }

                let manifold = self.solver.test_collision(a, b);
                stats.pairs_tested += 1;
                if !manifold.collided {
                    continue;
                }
                stats.collisions += 1;

                let filter = match (a.collider(), b.collider()) {
                    (Some(ca), Some(cb)) => filter_pair(ca, a.tag(), id, cb, b.tag(), other),
                    _ => PairFilter::Drop,
                };
                match filter {
                    PairFilter::Drop => {
                        stats.dropped += 1;
                    }
                    PairFilter::TriggerOnly => {
                        stats.triggers += 1;
                        self.report(CollisionEvent::from_manifold(&manifold, true));
                    }
                    PairFilter::Resolve => {
                        self.report(CollisionEvent::from_manifold(&manifold, false));
                        if self.separate(&manifold) {
                            stats.separations += 1;
                        }
                    }
                }
                trace!(a = %id, b = %other, overlap = manifold.overlap, ?filter, "pair collided");
            }
        }
        self.order = order;
    }

    fn owns_pair(&self, a: ObjectId, b: ObjectId) -> bool {
        if self.pair_region.is_unbounded() {
            return true;
        }
        match (self.anchors.get(&a), self.anchors.get(&b)) {
            (Some(bounds_a), Some(bounds_b)) => self.pair_region.contains(pair_anchor(bounds_a, bounds_b)),
            // Registered mid-step; nobody else can have seen it.
            _ => true,
        }
    }

    /// Dispatches `event` unless its pair was already reported this step.
    fn report(&mut self, event: CollisionEvent) {
        if self.reported_pairs.insert(pair_key(event.object_a, event.object_b)) {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: CollisionEvent) {
        if let Some(a) = self.objects.get_mut(&event.object_a) {
            a.on_collision(&event);
        }
        if let Some(b) = self.objects.get_mut(&event.object_b) {
            b.on_collision(&event);
        }
        self.sink.emit(&event);
    }

    /// Pushes the pair apart along the manifold's penetration, split by inverse mass.
    /// Returns false when nothing moved (unknown ids, or both sides immovable).
    pub fn separate(&mut self, manifold: &CollisionManifold) -> bool {
        let (Some(a), Some(b)) = (
            self.objects.get(&manifold.object_a),
            self.objects.get(&manifold.object_b),
        ) else {
            return false;
        };
        let Some((delta_a, delta_b)) =
            separation_deltas(manifold.penetration, a.rigid_body(), b.rigid_body())
        else {
            return false;
        };

        let mut moved = false;
        for (id, delta) in [(manifold.object_a, delta_a), (manifold.object_b, delta_b)] {
            if delta == Vec2::ZERO {
                continue;
            }
            if let Some(object) = self.objects.get_mut(&id) {
                object.translate(delta);
                moved = true;
            }
        }
        moved
    }

    fn run_workers(&mut self, camera: &Camera) -> StepStats {
        if self.pool.as_ref().map_or(true, WorkerPool::is_empty) {
            return self.check_collisions();
        }
        let Some(pool) = self.pool.as_mut() else {
            return StepStats::default();
        };

        let layout = StripLayout::new(&camera.bounds, pool.len(), self.config.strip_margin);
        let mut batches: Vec<WorkerBatch> = (0..layout.len())
            .map(|i| WorkerBatch {
                region: layout.owned_range(i).unwrap_or_default(),
                objects: Vec::new(),
            })
            .collect();
        let mut before: FxHashMap<ObjectId, Vec2> = FxHashMap::default();
        for object in self.objects.values() {
            if object.is_destroyed() || object.collider().is_none() {
                continue;
            }
            before.insert(object.id(), object.center_of_mass());
            let snapshot = ObjectSnapshot::capture(object);
            for owner in layout.owners(&object.bounds()) {
                batches[owner].objects.push(snapshot.clone());
            }
        }

        let replies = pool.dispatch(self.step, batches);

        let mut stats = StepStats::default();
        let mut passes = 0;
        let mut events = Vec::new();
        for reply in replies {
            let Some(reply) = reply else {
                stats.workers_missing += 1;
                continue;
            };
            passes = passes.max(reply.stats.passes);
            stats += reply.stats;
            // Deltas against the pre-dispatch center of mass. An object in two batches
            // gets a correction from each worker, one per pair that worker owns.
            for correction in &reply.corrections {
                let (Some(start), Some(object)) = (
                    before.get(&correction.id),
                    self.objects.get_mut(&correction.id),
                ) else {
                    continue;
                };
                let delta = correction.center_of_mass - *start;
                if delta != Vec2::ZERO {
                    object.translate(delta);
                }
            }
            events.extend(reply.events);
        }
        stats.passes = passes;

        self.reported_pairs.clear();
        for event in events {
            self.report(event);
        }
        self.refresh_hash();

        debug!(
            pairs = stats.pairs_tested,
            collisions = stats.collisions,
            separations = stats.separations,
            missing = stats.workers_missing,
            "worker step finished"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Body, Collider};
    use crate::shapes::Polygon;
    const EPSILON: f64 = 1e-9;

    fn boxed(id: u64, x0: f64, y0: f64, x1: f64, y1: f64) -> Body {
        let poly = Polygon::rectangle(x1 - x0, y1 - y0).unwrap();
        Body::new(id, poly, Vec2::new((x0 + x1) / 2.0, (y0 + y1) / 2.0))
    }

    fn recording_manager(iterations: usize) -> CollisionManager<Body, Vec<CollisionEvent>> {
        let config = CollisionConfig {
            cell_size: 8.0,
            iterations,
            ..CollisionConfig::default()
        };
        CollisionManager::with_sink(config, Vec::new()).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = CollisionConfig {
            cell_size: 0.0,
            ..CollisionConfig::default()
        };
        assert!(CollisionManager::<Body>::new(config).is_err());
    }

    #[test]
    fn test_add_is_idempotent_and_requires_collider() {
        let mut manager = recording_manager(1);
        assert!(manager.add(boxed(1, 0.0, 0.0, 1.0, 1.0)));
        assert!(!manager.add(boxed(1, 5.0, 5.0, 6.0, 6.0)));
        assert!(!manager.add(boxed(2, 0.0, 0.0, 1.0, 1.0).with_collider(None)));
        assert_eq!(manager.len(), 1);
        assert!(manager.hash().contains(ObjectId(1)));
        assert!(!manager.hash().contains(ObjectId(2)));
        // The first registration wins.
        assert_eq!(manager.get(ObjectId(1)).unwrap().position(), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_delete_removes_from_registry_and_hash() {
        let mut manager = recording_manager(1);
        manager.add(boxed(1, 0.0, 0.0, 1.0, 1.0));
        assert!(manager.delete(ObjectId(1)).is_some());
        assert!(manager.is_empty());
        assert!(manager.hash().is_empty());
        assert!(manager.delete(ObjectId(1)).is_none());
    }

    #[test]
    fn test_update_hash_drops_destroyed_objects() {
        let mut manager = recording_manager(1);
        manager.add(boxed(1, 0.0, 0.0, 1.0, 1.0));
        manager.get_mut(ObjectId(1)).unwrap().destroy();
        manager.update_hash(ObjectId(1));
        assert!(!manager.hash().contains(ObjectId(1)));
        assert!(manager.contains(ObjectId(1)));
        // Unknown ids are ignored.
        manager.update_hash(ObjectId(99));

        let removed = manager.remove_destroyed();
        assert_eq!(removed.len(), 1);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_update_hash_follows_moves() {
        let mut manager = recording_manager(1);
        manager.add(boxed(1, 0.0, 0.0, 1.0, 1.0));
        manager.get_mut(ObjectId(1)).unwrap().translate(Vec2::new(100.0, 0.0));
        manager.update_hash(ObjectId(1));
        let cells = manager.hash().cells_of(ObjectId(1)).unwrap();
        assert!(cells.iter().all(|c| c.x >= 12));
    }

    #[test]
    fn test_equal_mass_separation() {
        let mut manager = recording_manager(1);
        manager.add(boxed(1, 0.0, 0.0, 10.0, 10.0));
        manager.add(boxed(2, 5.0, 0.0, 15.0, 10.0));
        let stats = manager.check_collisions();
        assert_eq!(stats.collisions, 1);
        assert_eq!(stats.separations, 1);

        let a = manager.get(ObjectId(1)).unwrap();
        let b = manager.get(ObjectId(2)).unwrap();
        assert!((a.position().x - 2.5).abs() < EPSILON);
        assert!((b.position().x - 12.5).abs() < EPSILON);
        assert!((a.bounds().max.x - b.bounds().min.x).abs() < EPSILON);
    }

    #[test]
    fn test_static_body_is_never_moved() {
        let mut manager = recording_manager(1);
        manager.add(boxed(1, 0.0, 0.0, 10.0, 10.0).with_rigid_body(RigidBody::new_static()));
        manager.add(boxed(2, 5.0, 0.0, 15.0, 10.0));
        manager.check_collisions();

        assert_eq!(manager.get(ObjectId(1)).unwrap().position(), Vec2::new(5.0, 5.0));
        assert!((manager.get(ObjectId(2)).unwrap().position().x - 15.0).abs() < EPSILON);
    }

    #[test]
    fn test_static_flag_wins_over_inverse_mass() {
        let odd_static = RigidBody {
            is_static: true,
            mass: 1.0,
            inverse_mass: 1.0,
        };
        let dynamic = RigidBody::new(1.0);
        let (da, db) = separation_deltas(Vec2::new(4.0, 0.0), &odd_static, &dynamic).unwrap();
        assert_eq!(da, Vec2::ZERO);
        assert_eq!(db, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_mass_weighted_separation() {
        let heavy = RigidBody::new(3.0); // inverse 1/3
        let light = RigidBody::new(1.0); // inverse 1
        let (da, db) = separation_deltas(Vec2::new(4.0, 0.0), &heavy, &light).unwrap();
        assert!((da.x - -1.0).abs() < EPSILON);
        assert!((db.x - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_both_immovable_is_a_no_op() {
        assert!(separation_deltas(
            Vec2::new(1.0, 0.0),
            &RigidBody::new_static(),
            &RigidBody::new(0.0)
        )
        .is_none());

        let mut manager = recording_manager(1);
        manager.add(boxed(1, 0.0, 0.0, 10.0, 10.0).with_rigid_body(RigidBody::new_static()));
        manager.add(boxed(2, 5.0, 0.0, 15.0, 10.0).with_rigid_body(RigidBody::new_static()));
        let stats = manager.check_collisions();
        assert_eq!(stats.collisions, 1);
        assert_eq!(stats.separations, 0);
        // The event still fires.
        assert_eq!(manager.sink().len(), 1);
    }

    #[test]
    fn test_trigger_reports_without_moving() {
        let mut manager = recording_manager(2);
        manager.add(boxed(1, 0.0, 0.0, 10.0, 10.0).with_collider(Some(Collider::trigger())));
        manager.add(boxed(2, 5.0, 0.0, 15.0, 10.0));
        let stats = manager.check_collisions();

        assert_eq!(stats.triggers, 2); // still overlapping on the second pass
        assert_eq!(stats.separations, 0);
        assert_eq!(manager.get(ObjectId(1)).unwrap().position(), Vec2::new(5.0, 5.0));
        assert_eq!(manager.get(ObjectId(2)).unwrap().position(), Vec2::new(10.0, 5.0));
        // One event per pair per step, heard by both participants.
        assert_eq!(manager.sink().len(), 1);
        assert!(manager.sink()[0].trigger);
        assert_eq!(manager.get(ObjectId(1)).unwrap().events().len(), 1);
        assert_eq!(manager.get(ObjectId(2)).unwrap().events().len(), 1);

        // The next step reports the persisting overlap again.
        manager.check_collisions();
        assert_eq!(manager.sink().len(), 2);
    }

    #[test]
    fn test_pair_resolved_over_several_passes_is_reported_once() {
        // Light bodies squeezed between two statics keep colliding across passes.
        let mut manager = recording_manager(3);
        manager.add(boxed(1, 0.0, 0.0, 10.0, 10.0).with_rigid_body(RigidBody::new_static()));
        manager.add(boxed(2, 8.0, 0.0, 18.0, 10.0));
        manager.add(boxed(3, 16.0, 0.0, 26.0, 10.0).with_rigid_body(RigidBody::new_static()));
        let stats = manager.check_collisions();

        assert!(stats.separations > 2, "{stats:?}");
        let mut seen = FxHashSet::default();
        for event in manager.sink() {
            assert!(seen.insert(pair_key(event.object_a, event.object_b)));
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_pair_region_skips_pairs_anchored_outside() {
        let mut manager = recording_manager(2);
        manager.set_pair_region(OwnedRange::new(Some(100.0), None));
        manager.add(boxed(1, 0.0, 0.0, 10.0, 10.0));
        manager.add(boxed(2, 5.0, 0.0, 15.0, 10.0)); // anchored at 5
        manager.add(boxed(3, 95.0, 0.0, 105.0, 10.0));
        manager.add(boxed(4, 100.0, 0.0, 110.0, 10.0)); // anchored at 100
        let stats = manager.check_collisions();

        assert_eq!(stats.separations, 1);
        assert_eq!(manager.sink().len(), 1);
        assert_eq!(pair_key(manager.sink()[0].object_a, manager.sink()[0].object_b), (ObjectId(3), ObjectId(4)));
        assert_eq!(manager.get(ObjectId(1)).unwrap().position(), Vec2::new(5.0, 5.0));
        assert!((manager.get(ObjectId(3)).unwrap().position().x - 97.5).abs() < EPSILON);
        assert!((manager.get(ObjectId(4)).unwrap().position().x - 107.5).abs() < EPSILON);
    }

    #[test]
    fn test_ignored_pair_is_silent() {
        let mut manager = recording_manager(1);
        manager.add(
            boxed(1, 0.0, 0.0, 10.0, 10.0)
                .with_tag("ghost")
                .with_collider(Some(Collider::new().ignore("wall"))),
        );
        manager.add(boxed(2, 5.0, 0.0, 15.0, 10.0).with_tag("wall"));
        let stats = manager.check_collisions();
        assert_eq!(stats.dropped, 1);
        assert!(manager.sink().is_empty());
        assert!(manager.get(ObjectId(2)).unwrap().events().is_empty());
        assert_eq!(manager.get(ObjectId(1)).unwrap().position(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_allow_list_drops_unlisted() {
        let mut manager = recording_manager(1);
        manager.add(boxed(1, 0.0, 0.0, 10.0, 10.0).with_collider(Some(Collider::new().only_with(ObjectId(3)))));
        manager.add(boxed(2, 5.0, 0.0, 15.0, 10.0));
        let stats = manager.check_collisions();
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.separations, 0);
    }

    #[test]
    fn test_each_pair_resolved_once_per_pass() {
        // A and B share several cells, so each shows up in the other's query.
        let mut manager = recording_manager(1);
        manager.add(boxed(1, 0.0, 0.0, 20.0, 20.0));
        manager.add(boxed(2, 10.0, 1.0, 30.0, 19.0));
        manager.add(boxed(3, 25.0, 0.0, 45.0, 20.0));
        let stats = manager.check_collisions();

        let mut seen = FxHashSet::default();
        for event in manager.sink() {
            assert!(seen.insert(pair_key(event.object_a, event.object_b)));
        }
        assert_eq!(stats.separations, manager.sink().len());
    }

    #[test]
    fn test_event_normal_points_from_a_to_b() {
        let mut manager = recording_manager(1);
        manager.add(boxed(1, 0.0, 0.0, 10.0, 10.0));
        manager.add(boxed(2, 5.0, 0.0, 15.0, 10.0));
        manager.check_collisions();
        let event = manager.sink()[0];
        let com_a = manager.get(event.object_a).unwrap().center_of_mass();
        let com_b = manager.get(event.object_b).unwrap().center_of_mass();
        assert!((com_b - com_a).dot(event.normal) > 0.0);
        assert!((event.overlap - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_update_without_workers_runs_single_threaded() {
        let mut manager = recording_manager(2);
        manager.add(boxed(1, 0.0, 0.0, 10.0, 10.0));
        manager.add(boxed(2, 5.0, 0.0, 15.0, 10.0));
        let camera = Camera::centered(Vec2::ZERO, 100.0, 100.0);
        let stats = manager.update(&camera);
        assert_eq!(manager.worker_count(), 0);
        assert_eq!(manager.step(), 1);
        assert_eq!(stats.passes, 2);
        assert_eq!(stats.separations, 1);
    }

    #[test]
    fn test_channel_sink() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut manager: CollisionManager<Body, _> =
            CollisionManager::with_sink(CollisionConfig::default(), tx).unwrap();
        manager.add(boxed(1, 0.0, 0.0, 10.0, 10.0));
        manager.add(boxed(2, 5.0, 0.0, 15.0, 10.0));
        manager.check_collisions();
        let event = rx.try_recv().unwrap();
        assert!(event.collided);
        assert_eq!(pair_key(event.object_a, event.object_b), (ObjectId(1), ObjectId(2)));
    }
}
