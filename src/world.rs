// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! World: entities, stores and units, plus the tick driver

#[cfg(feature = "profiling")]
use tracing::{debug, info_span};

use crate::bitset::BitSet;
use crate::clock::Clock;
use crate::component::{Component, ComponentStore, Components};
use crate::config::WorldConfig;
use crate::entity::{release_components, Entity, EntityId, EntityMut, EntityTable};
use crate::error::{EcsError, Result};
use crate::event::LifecycleEvent;
use crate::int_list::IntList;
use crate::observer::{Observer, ObserverRegistry};
use crate::unit::{Context, ProcessingUnit, UnitId, UnitSlot};

/// Central ECS world
///
/// Mutations made through [`EntityMut`] are only queued. [`World::update`]
/// drains the queues in a fixed order and then runs every enabled unit.
pub struct World {
    entities: EntityTable,

    /// Registered stores, index = component id
    components: Components,

    /// Registered units, sorted by descending priority
    units: Vec<UnitSlot>,

    /// Units registered since the last update, still owed a catch-up pass
    pending_units: Vec<UnitId>,

    next_unit_id: u32,

    /// Observer registry for lifecycle events
    observers: ObserverRegistry,

    config: WorldConfig,

    /// Number of completed updates
    tick: u64,
}

impl World {
    /// Create a new, empty world with the default configuration.
    pub fn new() -> Self {
        Self::build(WorldConfig::default())
    }

    /// Create a world from a validated configuration.
    pub fn with_config(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: WorldConfig) -> Self {
        Self {
            entities: EntityTable::new(config.initial_entity_capacity, config.drain_order),
            components: Components::new(config.index_blocks),
            units: Vec::new(),
            pending_units: Vec::new(),
            next_unit_id: 0,
            observers: ObserverRegistry::new(),
            config,
            tick: 0,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    // ========== Registration ==========

    /// Register a component store. The handle's id is the store's bit in every
    /// entity's component mask.
    pub fn register_component<S: ComponentStore>(&mut self, store: S) -> Component<S> {
        let handle = self.components.register(store);
        #[cfg(feature = "profiling")]
        debug!(
            component = handle.id().0,
            kind = self.components.kind(handle.id()),
            "registered component store"
        );
        handle
    }

    /// Register a processing unit.
    ///
    /// The unit is placed after every unit of equal or higher priority and is
    /// offered every already-admitted entity at the start of the next update.
    pub fn register_unit<U: ProcessingUnit>(&mut self, unit: U) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;

        let slot = UnitSlot::new(id, Box::new(unit));
        let at = self
            .units
            .iter()
            .rposition(|s| s.priority >= slot.priority)
            .map_or(0, |i| i + 1);
        #[cfg(feature = "profiling")]
        debug!(
            unit = id.0,
            name = slot.name(),
            priority = slot.priority,
            position = at,
            "registered unit"
        );
        self.units.insert(at, slot);
        self.pending_units.push(id);
        id
    }

    fn slot(&self, id: UnitId) -> Option<&UnitSlot> {
        self.units.iter().find(|s| s.id == id)
    }

    fn slot_mut(&mut self, id: UnitId) -> Option<&mut UnitSlot> {
        self.units.iter_mut().find(|s| s.id == id)
    }

    pub(crate) fn unit_slots(&self) -> &[UnitSlot] {
        &self.units
    }

    /// Borrow a registered unit as its concrete type.
    pub fn unit<U: ProcessingUnit>(&self, id: UnitId) -> Option<&U> {
        (*self.slot(id)?.unit).as_any().downcast_ref::<U>()
    }

    pub fn unit_mut<U: ProcessingUnit>(&mut self, id: UnitId) -> Option<&mut U> {
        (*self.slot_mut(id)?.unit).as_any_mut().downcast_mut::<U>()
    }

    /// Enable or disable a unit's `update` and `paint`. A disabled unit still
    /// tracks admissions and evictions. Returns false for an unknown id.
    pub fn set_unit_enabled(&mut self, id: UnitId, enabled: bool) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_unit_enabled(&self, id: UnitId) -> Option<bool> {
        self.slot(id).map(|s| s.enabled)
    }

    /// The unit's active set, in no particular order.
    pub fn active_entities(&self, id: UnitId) -> Option<&IntList> {
        self.slot(id).map(|s| &s.active)
    }

    /// Unit ids in processing order (highest priority first).
    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.iter().map(|s| s.id)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    // ========== Entities ==========

    /// Create an entity. An enabled entity is admitted into units on the next update.
    pub fn create(&mut self, enabled: bool) -> Result<EntityMut<'_>> {
        self.entities.create(&mut self.components, enabled)
    }

    /// Create an entity at a specific id.
    ///
    /// Fails with [`EcsError::InvariantViolation`] if the id is taken or lies
    /// more than [`MAX_ID_GAP`](crate::entity::MAX_ID_GAP) past the highest id
    /// handed out so far. Ids skipped over stay available to [`create`](Self::create).
    pub fn create_at(&mut self, id: EntityId, enabled: bool) -> Result<EntityMut<'_>> {
        self.entities.create_at(&mut self.components, id, enabled)
    }

    /// Recreate an entity at `id` with the components in `mask`, bypassing the
    /// add API. The entity is left disabled; enable it to have it admitted.
    pub fn restore(&mut self, id: EntityId, mask: &BitSet) -> Result<EntityMut<'_>> {
        self.entities.restore(&mut self.components, id, mask)
    }

    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(id).ok_or(EcsError::EntityNotFound(id))
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Result<EntityMut<'_>> {
        self.entities.entity_mut(&mut self.components, id)
    }

    /// True if an entity (possibly destroyed, not yet evicted) lives at `id`.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some()
    }

    /// All entities that have not been freed, in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter()
    }

    pub fn entity_table(&self) -> &EntityTable {
        &self.entities
    }

    // ========== Stores ==========

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut Components {
        &mut self.components
    }

    pub fn store<S: ComponentStore>(&self, component: &Component<S>) -> &S {
        self.components.get(component)
    }

    pub fn store_mut<S: ComponentStore>(&mut self, component: &Component<S>) -> &mut S {
        self.components.get_mut(component)
    }

    // ========== Observers ==========

    /// Subscribe to lifecycle events. Returns the observer's index.
    pub fn add_observer(&mut self, observer: impl Observer + 'static) -> usize {
        self.observers.register(Box::new(observer))
    }

    pub fn remove_observer(&mut self, index: usize) -> Option<Box<dyn Observer>> {
        self.observers.unregister(index)
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    // ========== Tick ==========

    /// Drain the mutation queues and run every enabled unit, in this order:
    /// unit catch-up, admission, reconsideration, eviction, processing.
    ///
    /// Each queue is popped until empty, so entities re-queued by unit hooks
    /// during a phase are handled within that same phase.
    pub fn update(&mut self, clock: &Clock) {
        #[cfg(feature = "profiling")]
        let span = info_span!(
            "world.update",
            tick = self.tick,
            entities = self.entities.len(),
            units = self.units.len()
        );
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let Self {
            entities,
            components,
            units,
            pending_units,
            observers,
            ..
        } = self;

        {
            #[cfg(feature = "profiling")]
            let _admit = info_span!(
                "world.admit",
                queued = entities.to_admit.len(),
                new_units = pending_units.len()
            )
            .entered();

            catch_up(entities, components, units, pending_units);
            admit(entities, components, units, observers);
        }
        {
            #[cfg(feature = "profiling")]
            let _reconsider =
                info_span!("world.reconsider", queued = entities.to_change.len()).entered();

            reconsider(entities, components, units, observers);
        }
        {
            #[cfg(feature = "profiling")]
            let _evict = info_span!("world.evict", queued = entities.to_evict.len()).entered();

            evict(entities, components, units, observers);
        }
        {
            #[cfg(feature = "profiling")]
            let _process = info_span!("world.process").entered();

            for slot in units.iter_mut() {
                slot.update(clock, &mut Context::new(entities, components));
            }
        }

        self.tick += 1;
    }

    /// Run every enabled unit's `paint`. Queues are not touched.
    pub fn paint(&mut self, clock: &Clock) {
        #[cfg(feature = "profiling")]
        let _span_guard = info_span!("world.paint", alpha = clock.alpha()).entered();

        for slot in &mut self.units {
            slot.paint(clock, &mut self.components);
        }
    }

    /// Snapshot of sizes and queue depths.
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            entities: self.entities.len(),
            free_ids: self.entities.free_ids().len(),
            queued_admit: self.entities.to_admit.len(),
            queued_change: self.entities.to_change.len(),
            queued_evict: self.entities.to_evict.len(),
            stores: self.components.len(),
            units: self.units.len(),
            tick: self.tick,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Offer every admitted, active entity to units registered since the last update.
fn catch_up(
    entities: &mut EntityTable,
    components: &mut Components,
    units: &mut [UnitSlot],
    pending_units: &mut Vec<UnitId>,
) {
    if pending_units.is_empty() {
        return;
    }
    let ids: Vec<EntityId> = entities
        .iter()
        .filter(|e| e.is_added() && e.is_active())
        .map(Entity::id)
        .collect();

    for unit in pending_units.drain(..) {
        let Some(slot) = units.iter_mut().find(|s| s.id == unit) else {
            continue;
        };
        let mut cx = Context::new(entities, components);
        for &id in &ids {
            slot.entity_admitted(id, &mut cx);
        }
    }
}

fn admit(
    entities: &mut EntityTable,
    components: &mut Components,
    units: &mut [UnitSlot],
    observers: &mut ObserverRegistry,
) {
    let order = entities.drain_order();
    while let Some(id) = EntityTable::pop(&mut entities.to_admit, order) {
        let Some(entity) = entities.get_mut(id) else {
            continue;
        };
        // stale entry left by an earlier holder of the id
        if !entity.take_admitting() {
            continue;
        }
        // disabled or destroyed again before the drain
        if !entity.is_active() {
            continue;
        }
        entity.note_added();

        let mut cx = Context::new(entities, components);
        for slot in units.iter_mut() {
            slot.entity_admitted(id, &mut cx);
        }
        if let Some(entity) = entities.get(id) {
            observers.broadcast(LifecycleEvent::Admitted, entity);
        }
    }
}

fn reconsider(
    entities: &mut EntityTable,
    components: &mut Components,
    units: &mut [UnitSlot],
    observers: &mut ObserverRegistry,
) {
    let order = entities.drain_order();
    while let Some(id) = EntityTable::pop(&mut entities.to_change, order) {
        let Some(entity) = entities.get_mut(id) else {
            continue;
        };
        // cleared before notifying so hooks can queue the entity again
        entity.clear_changing();

        if entity.is_active() {
            let mut cx = Context::new(entities, components);
            for slot in units.iter_mut() {
                slot.entity_reconsidered(id, &mut cx);
            }
        }
        if let Some(entity) = entities.get(id) {
            observers.broadcast(LifecycleEvent::Changed, entity);
        }
    }
}

fn evict(
    entities: &mut EntityTable,
    components: &mut Components,
    units: &mut [UnitSlot],
    observers: &mut ObserverRegistry,
) {
    let order = entities.drain_order();
    while let Some(id) = EntityTable::pop(&mut entities.to_evict, order) {
        let Some(entity) = entities.get_mut(id) else {
            continue;
        };
        entity.clear_evicting();
        // re-enabled before the drain
        if entity.is_active() {
            continue;
        }
        let destroyed = entity.is_destroyed();

        let mut cx = Context::new(entities, components);
        for slot in units.iter_mut() {
            slot.entity_evicted(id, &mut cx);
        }
        if let Some(entity) = entities.get_mut(id) {
            observers.broadcast(LifecycleEvent::Removed, entity);
            if destroyed {
                release_components(entity, components);
            }
        }
        if destroyed {
            entities.free(id);
            #[cfg(feature = "profiling")]
            debug!(entity = id, "recycled entity id");
        }
    }
}

/// World size and queue depths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldStats {
    pub entities: usize,
    pub free_ids: usize,
    pub queued_admit: usize,
    pub queued_change: usize,
    pub queued_evict: usize,
    pub stores: usize,
    pub units: usize,
    pub tick: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{IntStore, XyStore};

    struct Tagged {
        name: &'static str,
        priority: i32,
    }

    impl ProcessingUnit for Tagged {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn is_interested(&self, _: &Entity, _: &Components) -> bool {
            true
        }
    }

    fn tagged(name: &'static str, priority: i32) -> Tagged {
        Tagged { name, priority }
    }

    #[test]
    fn test_units_sorted_by_priority() {
        let mut world = World::new();
        let low = world.register_unit(tagged("low", 1));
        let high = world.register_unit(tagged("high", 10));
        let mid = world.register_unit(tagged("mid", 5));
        let mid2 = world.register_unit(tagged("mid2", 5));

        assert_eq!(world.unit_ids().collect::<Vec<_>>(), vec![high, mid, mid2, low]);
        assert_eq!(world.unit::<Tagged>(mid2).map(|u| u.name), Some("mid2"));
    }

    #[test]
    fn test_unit_enable_flag() {
        let mut world = World::new();
        let id = world.register_unit(tagged("a", 0));
        assert_eq!(world.is_unit_enabled(id), Some(true));
        assert!(world.set_unit_enabled(id, false));
        assert_eq!(world.is_unit_enabled(id), Some(false));
        assert!(!world.set_unit_enabled(UnitId(42), false));
    }

    #[test]
    fn test_with_config_validates() {
        let config = WorldConfig {
            initial_entity_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(World::with_config(config), Err(EcsError::Config(_))));
    }

    #[test]
    fn test_entity_lookup() {
        let mut world = World::new();
        assert_eq!(world.entity(3).err(), Some(EcsError::EntityNotFound(3)));
        let id = world.create(true).unwrap().id();
        assert!(world.entity(id).unwrap().is_enabled());
        assert!(world.contains(id));
        assert!(world.entity_mut(id + 1).is_err());
    }

    #[test]
    fn test_stats_track_queues() {
        let mut world = World::new();
        let pos = world.register_component(XyStore::new());
        world.register_component(IntStore::new());
        world.register_unit(tagged("all", 0));

        let id = world.create(true).unwrap().id();
        world.create(false).unwrap();
        let stats = world.stats();
        assert_eq!((stats.entities, stats.queued_admit), (2, 1));
        assert_eq!((stats.stores, stats.units, stats.tick), (2, 1, 0));

        world.update(&Clock::new());
        world.entity_mut(id).unwrap().add(&pos).unwrap();
        world.entity_mut(id).unwrap().destroy();
        let stats = world.stats();
        assert_eq!((stats.queued_admit, stats.queued_change, stats.queued_evict), (0, 1, 1));

        world.update(&Clock::new());
        let stats = world.stats();
        assert_eq!((stats.entities, stats.free_ids, stats.tick), (1, 1, 2));
    }
}
