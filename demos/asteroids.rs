//! Demo: a headless asteroid field
//!
//! Shows stores, priority-ordered units, entities created and destroyed from
//! inside unit hooks, fixed-step updates and interpolated painting.
//!
//! Run with: cargo run --example asteroids

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use glam::Vec2;
use sparse_ecs::debug::WorldInspector;
use sparse_ecs::prelude::*;

const SPLIT: u32 = 1 << 0;
const FIELD: f32 = 100.0;

#[derive(Clone, Copy)]
struct Stores {
    pos: Component<XyStore>,
    old_pos: Component<XyStore>,
    vel: Component<XyStore>,
    lifetime: Component<FloatStore>,
    size: Component<IntStore>,
    flags: Component<MaskStore>,
    name: Component<GenericStore<String>>,
}

/// Integrates velocity and wraps around the field.
struct Movement {
    s: Stores,
}

impl ProcessingUnit for Movement {
    fn name(&self) -> &str {
        "movement"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn is_interested(&self, entity: &Entity, _: &Components) -> bool {
        entity.has(&self.s.pos) && entity.has(&self.s.vel)
    }

    fn update(&mut self, clock: &Clock, entities: &IntList, cx: &mut Context<'_>) {
        let dt = clock.delta_seconds();
        let components = cx.components_mut();
        for id in entities.iter() {
            components.copy_xy(&self.s.old_pos, &self.s.pos, id);
        }
        let (pos, vel) = components.pair_mut(&self.s.pos, &self.s.vel);
        for id in entities.iter() {
            let next = pos.get(id) + vel.get(id) * dt;
            pos.set_vec(id, next.rem_euclid(Vec2::splat(FIELD)));
        }
    }
}

/// Counts down lifetimes; expired rocks split once, then vanish.
struct Aging {
    s: Stores,
    spawned: Rc<Cell<u32>>,
}

impl ProcessingUnit for Aging {
    fn name(&self) -> &str {
        "aging"
    }

    fn priority(&self) -> i32 {
        5
    }

    fn is_interested(&self, entity: &Entity, _: &Components) -> bool {
        entity.has(&self.s.lifetime)
    }

    fn update(&mut self, clock: &Clock, entities: &IntList, cx: &mut Context<'_>) {
        let dt = clock.delta_seconds();
        let mut expired = Vec::new();
        let lifetime = cx.store_mut(&self.s.lifetime);
        for id in entities.iter() {
            lifetime.add(id, -dt);
            if lifetime.get(id) <= 0.0 {
                expired.push(id);
            }
        }

        for id in expired {
            let size = cx.store(&self.s.size).get(id);
            let at = cx.store(&self.s.pos).get(id);
            let split = cx.store(&self.s.flags).is_set(id, SPLIT);
            if let Ok(mut rock) = cx.entity_mut(id) {
                rock.destroy();
            }
            if size > 1 && !split {
                for dir in [Vec2::X, Vec2::NEG_X] {
                    if spawn_rock(cx, &self.s, at, dir * 8.0, size - 1, true).is_ok() {
                        self.spawned.set(self.spawned.get() + 1);
                    }
                }
            }
        }
    }
}

/// Interpolated positions for the current frame.
struct Renderer {
    s: Stores,
    frame: Vec<(EntityId, Vec2)>,
}

impl ProcessingUnit for Renderer {
    fn name(&self) -> &str {
        "renderer"
    }

    fn is_interested(&self, entity: &Entity, _: &Components) -> bool {
        entity.has(&self.s.pos) && entity.has(&self.s.old_pos)
    }

    fn evicted(&mut self, _entity: EntityId, index: usize, _cx: &mut Context<'_>) {
        // mirror the active set's swap-remove
        if index < self.frame.len() {
            self.frame.swap_remove(index);
        }
    }

    fn paint(&mut self, clock: &Clock, entities: &IntList, components: &mut Components) {
        let pos = components.get(&self.s.pos);
        let old = components.get(&self.s.old_pos);
        self.frame.clear();
        for id in entities.iter() {
            self.frame
                .push((id, old.get(id).lerp(pos.get(id), clock.alpha())));
        }
    }
}

fn spawn_rock(
    cx: &mut Context<'_>,
    s: &Stores,
    at: Vec2,
    vel: Vec2,
    size: i32,
    split: bool,
) -> Result<EntityId> {
    let mut rock = cx.create(false)?;
    let id = rock.id();
    rock.add_all(&[
        s.pos.id(),
        s.old_pos.id(),
        s.vel.id(),
        s.lifetime.id(),
        s.size.id(),
        s.flags.id(),
        s.name.id(),
    ])?;
    rock.store_mut(&s.pos).set_vec(id, at);
    rock.store_mut(&s.old_pos).set_vec(id, at);
    rock.store_mut(&s.vel).set_vec(id, vel);
    rock.store_mut(&s.lifetime).set(id, size as f32 * 0.5);
    rock.store_mut(&s.size).set(id, size);
    if split {
        rock.store_mut(&s.flags).set_flag(id, SPLIT);
    }
    rock.store_mut(&s.name).set(id, format!("rock-{id}"));
    rock.set_enabled(true)?;
    Ok(id)
}

fn main() -> Result<()> {
    let mut world = World::new();

    let released = Rc::new(Cell::new(0u32));
    let counter = released.clone();
    let s = Stores {
        pos: world.register_component(XyStore::new()),
        old_pos: world.register_component(XyStore::new()),
        vel: world.register_component(XyStore::new()),
        lifetime: world.register_component(FloatStore::new()),
        size: world.register_component(IntStore::new()),
        flags: world.register_component(MaskStore::new()),
        name: world.register_component(GenericStore::with_release(move |_name: String| {
            counter.set(counter.get() + 1)
        })),
    };

    let spawned = Rc::new(Cell::new(0u32));
    let renderer = world.register_unit(Renderer {
        s,
        frame: Vec::new(),
    });
    world.register_unit(Aging {
        s,
        spawned: spawned.clone(),
    });
    world.register_unit(Movement { s });

    let removed = Rc::new(Cell::new(0u32));
    let removed_count = removed.clone();
    world.add_observer(move |event: LifecycleEvent, _: &Entity| {
        if event == LifecycleEvent::Removed {
            removed_count.set(removed_count.get() + 1);
        }
    });

    println!("Creating asteroids...");
    for i in 0..8 {
        let angle = i as f32 * std::f32::consts::TAU / 8.0;
        let dir = Vec2::from_angle(angle);
        let mut rock = world.create(true)?;
        let id = rock.id();
        rock.add_all(&[
            s.pos.id(),
            s.old_pos.id(),
            s.vel.id(),
            s.lifetime.id(),
            s.size.id(),
            s.flags.id(),
        ])?;
        rock.store_mut(&s.pos).set_vec(id, Vec2::splat(FIELD / 2.0) + dir * 10.0);
        rock.store_mut(&s.vel).set_vec(id, dir * 5.0);
        rock.store_mut(&s.lifetime).set(id, 0.5 + i as f32 * 0.25);
        rock.store_mut(&s.size).set(id, 3);
    }

    let mut clock = Clock::new();
    let mut fixed = FixedStep::new(30);
    for frame in 0..120 {
        // uneven frame times
        let delta = Duration::from_millis(if frame % 3 == 0 { 40 } else { 25 });
        for _ in 0..fixed.tick(delta) {
            clock.advance(fixed.timestep());
            world.update(&clock);
        }
        clock.set_alpha(fixed.alpha());
        world.paint(&clock);

        if frame % 30 == 0 {
            let painted = world
                .unit::<Renderer>(renderer)
                .map_or(0, |r| r.frame.len());
            println!(
                "frame {frame:3}: {} live, {painted} painted, {} split off, {} removed",
                world.entity_table().len(),
                spawned.get(),
                removed.get()
            );
        }
    }

    println!();
    WorldInspector::print_summary(&world);
    println!("\nNames released: {}", released.get());
    Ok(())
}
