//! Benchmarks for the tick protocol and store access
//!
//! Run with: cargo bench
//!
//! This benchmark suite measures:
//! - Entity creation and admission
//! - Per-tick processing over an active set
//! - Raw store access
//! - Destroy and id recycling

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hecs::World as HecsWorld;
use sparse_ecs::prelude::*;

#[derive(Debug, Copy, Clone)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Copy, Clone)]
struct Velocity {
    x: f32,
    y: f32,
}

struct Movement {
    pos: Component<XyStore>,
    vel: Component<XyStore>,
}

impl ProcessingUnit for Movement {
    fn is_interested(&self, entity: &Entity, _: &Components) -> bool {
        entity.has(&self.pos) && entity.has(&self.vel)
    }

    fn update(&mut self, clock: &Clock, entities: &IntList, cx: &mut Context<'_>) {
        let dt = clock.delta_seconds();
        let (pos, vel) = cx.components_mut().pair_mut(&self.pos, &self.vel);
        for id in entities.iter() {
            pos.add(id, vel.get_x(id) * dt, vel.get_y(id) * dt);
        }
    }
}

struct Setup {
    world: World,
    pos: Component<XyStore>,
    vel: Component<XyStore>,
}

fn setup(count: u32) -> Setup {
    let mut world = World::new();
    let pos = world.register_component(XyStore::new());
    let vel = world.register_component(XyStore::new());
    world.register_unit(Movement { pos, vel });
    for i in 0..count {
        let mut e = world.create(true).expect("create");
        e.add(&pos).expect("add pos");
        e.add_with(&vel, |store, id| store.set(id, 1.0, i as f32))
            .expect("add vel");
    }
    world.update(&Clock::new());
    Setup { world, pos, vel }
}

fn clock() -> Clock {
    let mut clock = Clock::new();
    clock.advance(std::time::Duration::from_millis(16));
    clock
}

// Bench: creating entities and admitting them into a unit
fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");

    group.bench_function("sparse_create_admit_1k", |b| {
        b.iter(|| black_box(setup(1_000)));
    });
    group.bench_function("hecs_spawn_1k", |b| {
        b.iter(|| {
            let mut world = HecsWorld::new();
            for i in 0..1_000 {
                world.spawn((
                    Position { x: 0.0, y: 0.0 },
                    Velocity {
                        x: 1.0,
                        y: i as f32,
                    },
                ));
            }
            black_box(world)
        });
    });

    group.finish();
}

// Bench: one update over the whole active set
fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    let clock = clock();

    for count in [1_000u32, 10_000, 100_000] {
        let mut setup = setup(count);
        group.bench_with_input(BenchmarkId::new("sparse_movement", count), &count, |b, _| {
            b.iter(|| setup.world.update(black_box(&clock)));
        });

        let mut world = HecsWorld::new();
        for i in 0..count {
            world.spawn((
                Position { x: 0.0, y: 0.0 },
                Velocity {
                    x: 1.0,
                    y: i as f32,
                },
            ));
        }
        let dt = clock.delta_seconds();
        group.bench_with_input(BenchmarkId::new("hecs_movement", count), &count, |b, _| {
            b.iter(|| {
                for (_, (pos, vel)) in world.query_mut::<(&mut Position, &Velocity)>() {
                    pos.x += vel.x * dt;
                    pos.y += vel.y * dt;
                }
            });
        });
    }

    group.finish();
}

// Bench: raw store reads outside any unit
fn bench_store_access(c: &mut Criterion) {
    let setup = setup(10_000);
    let ids: Vec<EntityId> = setup.world.entities().map(Entity::id).collect();

    c.bench_function("xy_store_sum_10k", |b| {
        b.iter(|| {
            let vel = setup.world.store(&setup.vel);
            let mut sum = 0.0f32;
            for &id in &ids {
                sum += vel.get_y(id);
            }
            black_box(sum)
        });
    });
    c.bench_function("xy_store_vec2_10k", |b| {
        b.iter(|| {
            let pos = setup.world.store(&setup.pos);
            let mut acc = glam::Vec2::ZERO;
            for &id in &ids {
                acc += pos.get(id);
            }
            black_box(acc)
        });
    });
}

// Bench: destroy everything, then recreate through recycled ids
fn bench_recycle(c: &mut Criterion) {
    c.bench_function("destroy_recreate_1k", |b| {
        let mut setup = setup(1_000);
        b.iter(|| {
            let ids: Vec<EntityId> = setup.world.entities().map(Entity::id).collect();
            for id in ids {
                setup.world.entity_mut(id).expect("live").destroy();
            }
            setup.world.update(&Clock::new());
            for _ in 0..1_000 {
                let mut e = setup.world.create(true).expect("create");
                e.add(&setup.pos).expect("add pos");
                e.add(&setup.vel).expect("add vel");
            }
            setup.world.update(&Clock::new());
        });
    });
}

criterion_group!(
    benches,
    bench_create,
    bench_update,
    bench_store_access,
    bench_recycle
);
criterion_main!(benches);
