use collision_engine::{
    Body, Camera, Collidable, CollisionConfig, CollisionEvent, CollisionManager, ObjectId,
    Polygon, RigidBody, StepStats, Vec2,
};
use std::env;
use std::error::Error;
use std::fs;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const COLUMNS: u64 = 12;
const ROWS: u64 = 8;
const BOX_SIZE: f64 = 20.0;
const FALL_PER_TICK: f64 = 4.0;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Usage: collision_demo [config.json] [ticks]
    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => CollisionConfig::from_json(&fs::read_to_string(path)?)?,
        None => CollisionConfig::default(),
    };
    let ticks: u64 = match args.get(2) {
        Some(raw) => raw.parse()?,
        None => 120,
    };

    let (events_tx, events_rx) = std::sync::mpsc::channel::<CollisionEvent>();
    let mut manager = CollisionManager::with_sink(config, events_tx)?;
    build_scene(&mut manager)?;
    info!(
        objects = manager.len(),
        workers = manager.worker_count(),
        ticks,
        "scene ready"
    );

    let width = COLUMNS as f64 * BOX_SIZE * 1.5;
    let camera = Camera::new(Vec2::new(-BOX_SIZE, -BOX_SIZE), Vec2::new(width, 400.0));
    let mut total = StepStats::default();
    for tick in 1..=ticks {
        apply_movement(&mut manager);
        let stats = manager.update(&camera);
        let events = events_rx.try_iter().count();
        if stats.workers_missing > 0 {
            warn!(tick, missing = stats.workers_missing, "positions carried forward");
        }
        info!(
            tick,
            pairs = stats.pairs_tested,
            collisions = stats.collisions,
            separations = stats.separations,
            events,
            "tick"
        );
        total += stats;
    }

    let lowest = manager
        .iter()
        .filter(|b| !b.rigid_body().is_static)
        .map(|b| b.bounds().min.y)
        .fold(f64::INFINITY, f64::min);
    info!(
        collisions = total.collisions,
        separations = total.separations,
        lowest,
        "done"
    );
    Ok(())
}

/// A static floor under a loose grid of boxes that all drift downwards.
fn build_scene<S: collision_engine::CollisionEventSink>(
    manager: &mut CollisionManager<Body, S>,
) -> collision_engine::Result<()> {
    let floor_width = COLUMNS as f64 * BOX_SIZE * 1.5 + BOX_SIZE * 2.0;
    let floor = Body::new(
        ObjectId(0),
        Polygon::rectangle(floor_width, BOX_SIZE)?,
        Vec2::new(floor_width / 2.0 - BOX_SIZE, -BOX_SIZE / 2.0),
    )
    .with_tag("floor")
    .with_rigid_body(RigidBody::new_static());
    manager.add(floor);

    let mut id = 1;
    for row in 0..ROWS {
        for column in 0..COLUMNS {
            let x = column as f64 * BOX_SIZE * 1.5 + (row % 2) as f64 * BOX_SIZE * 0.5;
            let y = BOX_SIZE * 2.0 + row as f64 * BOX_SIZE * 1.2;
            let mut body = Body::new(ObjectId(id), Polygon::rectangle(BOX_SIZE, BOX_SIZE)?, Vec2::new(x, y))
                .with_tag("crate")
                .with_rigid_body(RigidBody::new(1.0 + (id % 3) as f64));
            body.movement = Vec2::new(0.0, -FALL_PER_TICK);
            manager.add(body);
            id += 1;
        }
    }
    Ok(())
}

fn apply_movement<S: collision_engine::CollisionEventSink>(manager: &mut CollisionManager<Body, S>) {
    let ids: Vec<ObjectId> = manager.ids().collect();
    for id in ids {
        if let Some(body) = manager.get_mut(id) {
            let movement = body.movement;
            if movement != Vec2::ZERO {
                body.translate(movement);
            }
        }
    }
}
