//! Demo: tick phases traced with `tracing`
//!
//! Run with: cargo run --example profiled_tick --features profiling
//!
//! Pass a path to write JSON lines to a file instead of stdout:
//! cargo run --example profiled_tick --features profiling -- logs/ticks.jsonl

use std::time::Instant;

use sparse_ecs::observer::LoggingObserver;
use sparse_ecs::profiling::{self, ProfilingConfig};
use sparse_ecs::prelude::*;

struct Health {
    hp: Component<IntStore>,
}

impl ProcessingUnit for Health {
    fn name(&self) -> &str {
        "health"
    }

    fn is_interested(&self, entity: &Entity, _: &Components) -> bool {
        entity.has(&self.hp)
    }

    fn update(&mut self, _clock: &Clock, entities: &IntList, cx: &mut Context<'_>) {
        let mut dead = Vec::new();
        let hp = cx.store_mut(&self.hp);
        for id in entities.iter() {
            hp.add(id, -1);
            if hp.get(id) <= 0 {
                dead.push(id);
            }
        }
        for id in dead {
            if let Ok(mut e) = cx.entity_mut(id) {
                e.destroy();
            }
        }
    }
}

fn main() -> Result<()> {
    let log_file = std::env::args().nth(1);
    let config = ProfilingConfig {
        level: "debug".into(),
        json: log_file.is_some(),
        log_file: log_file.map(Into::into),
    };
    let _guard = profiling::init(&config)?;

    let mut world = World::with_config(WorldConfig::from_json_str(
        r#"{ "initial_entity_capacity": 4096, "drain_order": "fifo" }"#,
    )?)?;
    world.add_observer(LoggingObserver);

    let hp = world.register_component(IntStore::new());
    world.register_unit(Health { hp });

    for i in 0..2_000 {
        world
            .create(true)?
            .add_with(&hp, |store, id| store.set(id, 1 + i % 5))?;
    }

    let start = Instant::now();
    let mut clock = Clock::new();
    for _ in 0..6 {
        clock.advance(std::time::Duration::from_millis(16));
        world.update(&clock);
        tracing::info!(stats = ?world.stats(), "tick done");
    }
    tracing::info!(elapsed = ?start.elapsed(), "finished");
    Ok(())
}
