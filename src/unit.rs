//! Processing units and the context they run in

use std::any::Any;

use crate::bitset::BitSet;
use crate::clock::Clock;
use crate::component::{Component, ComponentStore, Components};
use crate::entity::{Entity, EntityId, EntityMut, EntityTable};
use crate::error::{EcsError, Result};
use crate::int_list::IntList;

/// Unit ID (bit position in every entity's unit mask)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

impl UnitId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Downcasting support for boxed units.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A priority-ordered, interest-filtered consumer of entities.
///
/// The world keeps each unit's active set: every entity for which
/// [`is_interested`](ProcessingUnit::is_interested) held the last time the
/// entity was admitted or reconsidered. Interest is re-checked automatically
/// when components are added or removed; any other criterion must be backed
/// by a call to [`EntityMut::did_change`].
pub trait ProcessingUnit: AsAny {
    /// Get unit name
    fn name(&self) -> &str {
        "ProcessingUnit"
    }

    /// Higher priorities are notified and updated first.
    fn priority(&self) -> i32 {
        0
    }

    fn is_interested(&self, entity: &Entity, components: &Components) -> bool;

    /// `entity` just joined the active set.
    fn admitted(&mut self, _entity: EntityId, _cx: &mut Context<'_>) {}

    /// `entity` just left the active set from position `index`. The last
    /// entry was swapped into `index`, so a parallel array can mirror the move.
    fn evicted(&mut self, _entity: EntityId, _index: usize, _cx: &mut Context<'_>) {}

    /// Simulation step over the active set. Skipped while the unit is disabled.
    fn update(&mut self, _clock: &Clock, _entities: &IntList, _cx: &mut Context<'_>) {}

    /// Interpolation/presentation over the active set. Skipped while the unit is disabled.
    /// Entities cannot be created, changed or destroyed from here.
    fn paint(&mut self, _clock: &Clock, _entities: &IntList, _components: &mut Components) {}
}

/// Entities and stores as seen from inside a unit callback.
///
/// Entity mutations made here are queued like any other, so a unit can react
/// to another unit's changes within the same update.
pub struct Context<'w> {
    entities: &'w mut EntityTable,
    components: &'w mut Components,
}

impl<'w> Context<'w> {
    pub(crate) fn new(entities: &'w mut EntityTable, components: &'w mut Components) -> Self {
        Self {
            entities,
            components,
        }
    }

    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(id).ok_or(EcsError::EntityNotFound(id))
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Result<EntityMut<'_>> {
        self.entities.entity_mut(self.components, id)
    }

    pub fn create(&mut self, enabled: bool) -> Result<EntityMut<'_>> {
        self.entities.create(self.components, enabled)
    }

    pub fn restore(&mut self, id: EntityId, mask: &BitSet) -> Result<EntityMut<'_>> {
        self.entities.restore(self.components, id, mask)
    }

    pub fn entities(&self) -> &EntityTable {
        &*self.entities
    }

    pub fn components(&self) -> &Components {
        &*self.components
    }

    pub fn components_mut(&mut self) -> &mut Components {
        &mut *self.components
    }

    pub fn store<S: ComponentStore>(&self, component: &Component<S>) -> &S {
        self.components.get(component)
    }

    pub fn store_mut<S: ComponentStore>(&mut self, component: &Component<S>) -> &mut S {
        self.components.get_mut(component)
    }
}

/// A registered unit plus the state the world keeps for it.
pub(crate) struct UnitSlot {
    pub(crate) id: UnitId,
    pub(crate) priority: i32,
    pub(crate) enabled: bool,
    pub(crate) active: IntList,
    pub(crate) unit: Box<dyn ProcessingUnit>,
}

impl UnitSlot {
    pub(crate) fn new(id: UnitId, unit: Box<dyn ProcessingUnit>) -> Self {
        Self {
            id,
            priority: unit.priority(),
            enabled: true,
            active: IntList::new(),
            unit,
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.unit.name()
    }

    pub(crate) fn entity_admitted(&mut self, id: EntityId, cx: &mut Context<'_>) {
        let interested = match cx.entities.get(id) {
            Some(entity) if !entity.in_unit(self.id) => {
                self.unit.is_interested(entity, &*cx.components)
            }
            _ => false,
        };
        if interested {
            self.add_entity(id, cx);
        }
    }

    pub(crate) fn entity_reconsidered(&mut self, id: EntityId, cx: &mut Context<'_>) {
        let Some(entity) = cx.entities.get(id) else {
            return;
        };
        let was_in = entity.in_unit(self.id);
        let interested = self.unit.is_interested(entity, &*cx.components);
        if interested && !was_in {
            self.add_entity(id, cx);
        } else if !interested && was_in {
            self.remove_entity(id, cx);
        }
    }

    pub(crate) fn entity_evicted(&mut self, id: EntityId, cx: &mut Context<'_>) {
        if cx.entities.get(id).is_some_and(|e| e.in_unit(self.id)) {
            self.remove_entity(id, cx);
        }
    }

    pub(crate) fn update(&mut self, clock: &Clock, cx: &mut Context<'_>) {
        if self.enabled {
            self.unit.update(clock, &self.active, cx);
        }
    }

    pub(crate) fn paint(&mut self, clock: &Clock, components: &mut Components) {
        if self.enabled {
            self.unit.paint(clock, &self.active, components);
        }
    }

    fn add_entity(&mut self, id: EntityId, cx: &mut Context<'_>) {
        self.active.add(id);
        if let Some(entity) = cx.entities.get_mut(id) {
            entity.note_in(self.id);
        }
        self.unit.admitted(id, cx);
    }

    fn remove_entity(&mut self, id: EntityId, cx: &mut Context<'_>) {
        // O(n) scan of the active set
        let Some(index) = self.active.remove(id) else {
            return;
        };
        if let Some(entity) = cx.entities.get_mut(id) {
            entity.note_out(self.id);
        }
        self.unit.evicted(id, index, cx);
    }
}
