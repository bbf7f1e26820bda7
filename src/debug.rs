use crate::component::ComponentId;
use crate::entity::EntityId;
use crate::unit::UnitId;
use crate::world::World;

/// World inspector for debugging
pub struct WorldInspector;

impl WorldInspector {
    /// Get live entity count
    pub fn entity_count(world: &World) -> usize {
        world.entity_table().len()
    }

    /// Units in processing order
    pub fn unit_summary(world: &World) -> Vec<UnitInfo> {
        world
            .unit_slots()
            .iter()
            .map(|slot| UnitInfo {
                id: slot.id,
                name: slot.name().to_string(),
                priority: slot.priority,
                enabled: slot.enabled,
                active_count: slot.active.len(),
            })
            .collect()
    }

    /// Registered stores in id order
    pub fn store_summary(world: &World) -> Vec<StoreInfo> {
        let components = world.components();
        (0..components.len() as u32)
            .map(ComponentId)
            .map(|id| StoreInfo {
                id,
                kind: components.kind(id).unwrap_or("unknown"),
                entity_count: world.entities().filter(|e| e.has_id(id)).count(),
            })
            .collect()
    }

    /// Print world summary to console
    pub fn print_summary(world: &World) {
        let stats = world.stats();
        println!("=== World Summary ===");
        println!("Tick: {}", stats.tick);
        println!("Entities: {} ({} free ids)", stats.entities, stats.free_ids);
        println!(
            "Queued: {} admit, {} change, {} evict",
            stats.queued_admit, stats.queued_change, stats.queued_evict
        );

        println!("\n=== Units ===");
        for info in Self::unit_summary(world) {
            println!(
                "Unit {} '{}': priority {}, {} active{}",
                info.id.0,
                info.name,
                info.priority,
                info.active_count,
                if info.enabled { "" } else { " (disabled)" }
            );
        }

        println!("\n=== Stores ===");
        for info in Self::store_summary(world) {
            println!("Store {} ({}): {} entities", info.id.0, info.kind, info.entity_count);
        }
    }

    /// Print entity details
    pub fn print_entity(world: &World, entity: EntityId) {
        match world.entity(entity) {
            Ok(e) => {
                println!("=== Entity {entity} ===");
                println!(
                    "Enabled: {}, destroyed: {}, added: {}",
                    e.is_enabled(),
                    e.is_destroyed(),
                    e.is_added()
                );
                let components: Vec<u32> = e.component_ids().map(|c| c.0).collect();
                println!("Components: {components:?}");
                let units: Vec<usize> = e.unit_mask().ones().collect();
                println!("Units: {units:?}");
            }
            Err(_) => println!("Entity {entity} not found"),
        }
    }
}

/// Unit information for debugging
#[derive(Clone, Debug)]
pub struct UnitInfo {
    pub id: UnitId,
    pub name: String,
    pub priority: i32,
    pub enabled: bool,
    pub active_count: usize,
}

/// Store information for debugging
#[derive(Clone, Debug)]
pub struct StoreInfo {
    pub id: ComponentId,
    pub kind: &'static str,
    pub entity_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::component::{Components, MaskStore, XyStore};
    use crate::entity::Entity;
    use crate::unit::ProcessingUnit;

    struct Everything;

    impl ProcessingUnit for Everything {
        fn name(&self) -> &str {
            "everything"
        }

        fn is_interested(&self, _: &Entity, _: &Components) -> bool {
            true
        }
    }

    #[test]
    fn test_world_inspector() {
        let mut world = World::new();
        assert_eq!(WorldInspector::entity_count(&world), 0);

        let pos = world.register_component(XyStore::new());
        world.register_component(MaskStore::new());
        let unit = world.register_unit(Everything);
        world.create(true).unwrap().add(&pos).unwrap();
        world.create(false).unwrap();
        world.update(&Clock::new());

        assert_eq!(WorldInspector::entity_count(&world), 2);

        let units = WorldInspector::unit_summary(&world);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].id, unit);
        assert_eq!(units[0].name, "everything");
        assert_eq!(units[0].active_count, 1);

        let stores = WorldInspector::store_summary(&world);
        assert_eq!(stores[0].kind, "xy");
        assert_eq!(stores[0].entity_count, 1);
        assert_eq!(stores[1].kind, "mask");
        assert_eq!(stores[1].entity_count, 0);
    }
}
