use collision_engine::{
    Body, CollisionConfig, CollisionManager, ObjectId, Polygon, SatSolver, SpatialHash, Vec2,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// --- Helper for building a loosely packed grid of boxes ---
fn box_grid(count: usize, spacing: f64) -> Vec<Body> {
    let side = (count as f64).sqrt().ceil() as usize;
    (0..count)
        .map(|i| {
            let (col, row) = ((i % side) as f64, (i / side) as f64);
            let poly = Polygon::rectangle(10.0, 10.0).expect("rectangle");
            Body::new(i as u64, poly, Vec2::new(col * spacing, row * spacing))
        })
        .collect()
}

// Insert + query throughput of the broad phase alone
fn bench_spatial_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_hash");

    for n in [100, 1_000, 5_000].iter() {
        let bodies = box_grid(*n, 12.0);
        group.bench_with_input(BenchmarkId::new("rebuild_and_query", n), &bodies, |b, bodies| {
            b.iter(|| {
                let mut hash = SpatialHash::new(32.0).expect("cell size");
                for body in bodies {
                    hash.add(body);
                }
                let mut candidates = 0;
                for body in bodies {
                    candidates += hash.query(black_box(body)).len();
                }
                candidates
            });
        });
    }
    group.finish();
}

// Narrow phase on overlapping and separated pairs
fn bench_sat(c: &mut Criterion) {
    let mut group = c.benchmark_group("sat");
    let a = Body::new(1, Polygon::regular(8, 10.0).expect("octagon"), Vec2::ZERO);
    let hit = Body::new(2, Polygon::regular(8, 10.0).expect("octagon"), Vec2::new(15.0, 3.0));
    let miss = Body::new(3, Polygon::regular(8, 10.0).expect("octagon"), Vec2::new(20.5, 0.0));
    let mut solver = SatSolver::default();

    group.bench_function("octagon_overlap", |b| {
        b.iter(|| solver.test_collision(black_box(&a), black_box(&hit)))
    });
    group.bench_function("octagon_separated", |b| {
        b.iter(|| solver.test_collision(black_box(&a), black_box(&miss)))
    });
    group.finish();
}

// A full manager step over a packed grid where most neighbours overlap
fn bench_manager_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("manager_step");

    for n in [100, 1_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter(|| {
                let mut manager: CollisionManager<Body> =
                    CollisionManager::new(CollisionConfig::default()).expect("config");
                for body in box_grid(n, 9.0) {
                    manager.add(body);
                }
                let stats = manager.check_collisions();
                black_box(manager.get(ObjectId(0)).is_some());
                stats
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_spatial_hash, bench_sat, bench_manager_step);
criterion_main!(benches);
