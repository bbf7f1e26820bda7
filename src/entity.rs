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

//! Entities, the entity table and the entity mutation API.
//!
//! Mutating an entity never touches units directly. It flips bits and flags
//! and pushes the entity id onto one of the world's queues; the queues are
//! drained by [`World::update`](crate::World::update).

use crate::bitset::BitSet;
use crate::component::{Component, ComponentId, ComponentStore, Components};
use crate::error::{EcsError, Result};
use crate::int_list::IntList;
use crate::unit::UnitId;

/// Entity identifier. Stable while the entity lives, recycled after it is destroyed and evicted.
pub type EntityId = u32;

const ENABLED: u8 = 1 << 0;
const DESTROYED: u8 = 1 << 1;
const ADDED: u8 = 1 << 2;
const CHANGING: u8 = 1 << 3;
// queued for eviction and not yet drained
const EVICTING: u8 = 1 << 4;
// queued for admission and not yet drained
const ADMITTING: u8 = 1 << 5;

/// Furthest past the allocator's high-water mark a specific id may be placed.
pub const MAX_ID_GAP: u32 = 1 << 20;

/// An id plus the masks of the components it has and the units processing it.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    components: BitSet,
    units: BitSet,
    flags: u8,
}

impl Entity {
    fn new(id: EntityId) -> Self {
        Self {
            id,
            components: BitSet::new(),
            units: BitSet::new(),
            flags: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn is_enabled(&self) -> bool {
        self.flags & ENABLED != 0
    }

    pub fn is_destroyed(&self) -> bool {
        self.flags & DESTROYED != 0
    }

    /// True once the entity has been through admission at least once.
    pub fn is_added(&self) -> bool {
        self.flags & ADDED != 0
    }

    /// True while the entity sits in the reconsideration queue.
    pub fn is_changing(&self) -> bool {
        self.flags & CHANGING != 0
    }

    #[inline]
    pub fn has<S>(&self, component: &Component<S>) -> bool {
        self.components.contains(component.id().index())
    }

    #[inline]
    pub fn has_id(&self, component: ComponentId) -> bool {
        self.components.contains(component.index())
    }

    /// True if unit `unit` currently has this entity in its active set.
    #[inline]
    pub fn in_unit(&self, unit: UnitId) -> bool {
        self.units.contains(unit.index())
    }

    pub fn component_mask(&self) -> &BitSet {
        &self.components
    }

    pub fn unit_mask(&self) -> &BitSet {
        &self.units
    }

    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.ones().map(|bit| ComponentId(bit as u32))
    }

    /// Live in the world's units: enabled and not destroyed.
    pub(crate) fn is_active(&self) -> bool {
        self.flags & (ENABLED | DESTROYED) == ENABLED
    }

    pub(crate) fn note_added(&mut self) {
        self.flags |= ADDED;
    }

    pub(crate) fn clear_changing(&mut self) {
        self.flags &= !CHANGING;
    }

    pub(crate) fn clear_evicting(&mut self) {
        self.flags &= !EVICTING;
    }

    /// Clear the admission mark, returning whether it was set.
    pub(crate) fn take_admitting(&mut self) -> bool {
        let was = self.flags & ADMITTING != 0;
        self.flags &= !ADMITTING;
        was
    }

    pub(crate) fn note_in(&mut self, unit: UnitId) {
        self.units.set(unit.index());
    }

    pub(crate) fn note_out(&mut self, unit: UnitId) {
        self.units.clear(unit.index());
    }

    fn check_destroyed(&self, action: &str) -> Result<()> {
        if self.is_destroyed() {
            return Err(EcsError::destroyed(self.id, action));
        }
        Ok(())
    }
}

/// Which end of a queue is drained first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainOrder {
    /// Newest first
    #[default]
    Lifo,
    /// Oldest first
    Fifo,
}

/// Entity slots, the id allocator and the three per-tick mutation queues.
pub struct EntityTable {
    slots: Vec<Option<Entity>>,
    free_ids: IntList,
    next_id: EntityId,
    live: usize,
    drain_order: DrainOrder,
    pub(crate) to_admit: IntList,
    pub(crate) to_change: IntList,
    pub(crate) to_evict: IntList,
}

impl EntityTable {
    pub(crate) fn new(capacity: usize, drain_order: DrainOrder) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(capacity.max(1), || None);
        Self {
            slots,
            free_ids: IntList::new(),
            next_id: 0,
            live: 0,
            drain_order,
            to_admit: IntList::new(),
            to_change: IntList::new(),
            to_evict: IntList::new(),
        }
    }

    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id as usize)?.as_ref()
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id as usize)?.as_mut()
    }

    /// Number of live (not yet freed) entities.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn free_ids(&self) -> &IntList {
        &self.free_ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub(crate) fn ids(&self) -> Vec<EntityId> {
        self.iter().map(Entity::id).collect()
    }

    fn claim_id(&mut self) -> EntityId {
        match self.free_ids.remove_last() {
            Some(id) => id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
        }
    }

    /// Take `id` out of the allocator's hands so a later claim cannot hand it out again.
    fn reserve_id(&mut self, id: EntityId) -> Result<()> {
        if id < self.next_id {
            self.free_ids.remove(id);
            return Ok(());
        }
        let next = id
            .checked_add(1)
            .filter(|_| id - self.next_id <= MAX_ID_GAP)
            .ok_or_else(|| {
                EcsError::InvariantViolation(format!(
                    "entity id {id} is out of range (next id is {})",
                    self.next_id
                ))
            })?;
        for skipped in self.next_id..id {
            self.free_ids.add(skipped);
        }
        self.next_id = next;
        Ok(())
    }

    fn check_vacant(&self, id: EntityId) -> Result<()> {
        if self.get(id).is_some() {
            return Err(EcsError::InvariantViolation(format!(
                "entity slot {id} is already occupied"
            )));
        }
        Ok(())
    }

    fn insert(&mut self, id: EntityId) -> Result<&mut Entity> {
        let index = id as usize;
        if index >= self.slots.len() {
            let mut len = self.slots.len();
            while index >= len {
                len *= 2;
            }
            self.slots.resize_with(len, || None);
        }
        let slot = &mut self.slots[index];
        if slot.is_some() {
            return Err(EcsError::InvariantViolation(format!(
                "entity slot {id} is already occupied"
            )));
        }
        self.live += 1;
        Ok(slot.insert(Entity::new(id)))
    }

    /// Drop the entity at `id` and hand the id back to the allocator.
    pub(crate) fn free(&mut self, id: EntityId) {
        if let Some(slot) = self.slots.get_mut(id as usize) {
            if slot.take().is_some() {
                self.live -= 1;
                self.free_ids.add(id);
            }
        }
    }

    pub(crate) fn pop(queue: &mut IntList, order: DrainOrder) -> Option<EntityId> {
        match order {
            DrainOrder::Lifo => queue.remove_last(),
            DrainOrder::Fifo => queue.remove_first(),
        }
    }

    pub(crate) fn drain_order(&self) -> DrainOrder {
        self.drain_order
    }

    /// Create an entity, queued for admission if `enabled`.
    pub(crate) fn create<'a>(
        &'a mut self,
        components: &'a mut Components,
        enabled: bool,
    ) -> Result<EntityMut<'a>> {
        let id = self.claim_id();
        self.spawn(components, id, enabled)
    }

    /// Low-level create at a specific id. Fails if the slot is occupied or the
    /// id is out of the allocator's range.
    pub(crate) fn create_at<'a>(
        &'a mut self,
        components: &'a mut Components,
        id: EntityId,
        enabled: bool,
    ) -> Result<EntityMut<'a>> {
        self.check_vacant(id)?;
        self.reserve_id(id)?;
        self.spawn(components, id, enabled)
    }

    fn spawn<'a>(
        &'a mut self,
        components: &'a mut Components,
        id: EntityId,
        enabled: bool,
    ) -> Result<EntityMut<'a>> {
        self.insert(id)?;
        let mut entity = EntityMut {
            table: self,
            components,
            id,
        };
        if enabled {
            entity.set_enabled(true)?;
        }
        Ok(entity)
    }

    /// Recreate an entity with a known component mask, leaving it disabled.
    pub(crate) fn restore<'a>(
        &'a mut self,
        components: &'a mut Components,
        id: EntityId,
        mask: &BitSet,
    ) -> Result<EntityMut<'a>> {
        if let Some(bit) = mask.ones().find(|&bit| bit >= components.len()) {
            return Err(EcsError::InvariantViolation(format!(
                "restored entity {id} references unregistered component {bit}"
            )));
        }
        self.check_vacant(id)?;
        self.reserve_id(id)?;
        let entity = self.insert(id)?;
        entity.components.copy_from(mask);
        for bit in mask.ones() {
            components.ensure_slot(bit, id);
        }
        Ok(EntityMut {
            table: self,
            components,
            id,
        })
    }

    pub(crate) fn entity_mut<'a>(
        &'a mut self,
        components: &'a mut Components,
        id: EntityId,
    ) -> Result<EntityMut<'a>> {
        if self.get(id).is_none() {
            return Err(EcsError::EntityNotFound(id));
        }
        Ok(EntityMut {
            table: self,
            components,
            id,
        })
    }
}

/// Mutable access to one entity.
///
/// Every method only records intent; units see the result on the next update.
pub struct EntityMut<'a> {
    table: &'a mut EntityTable,
    components: &'a mut Components,
    id: EntityId,
}

impl<'a> EntityMut<'a> {
    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn entity(&self) -> &Entity {
        self.slot()
    }

    fn slot(&self) -> &Entity {
        match self.table.get(self.id) {
            Some(entity) => entity,
            None => unreachable!("EntityMut outlived entity {}", self.id),
        }
    }

    fn slot_mut(&mut self) -> &mut Entity {
        let id = self.id;
        match self.table.get_mut(id) {
            Some(entity) => entity,
            None => unreachable!("EntityMut outlived entity {id}"),
        }
    }

    pub fn has<S>(&self, component: &Component<S>) -> bool {
        self.slot().has(component)
    }

    pub fn store<S: ComponentStore>(&self, component: &Component<S>) -> &S {
        self.components.get(component)
    }

    pub fn store_mut<S: ComponentStore>(&mut self, component: &Component<S>) -> &mut S {
        self.components.get_mut(component)
    }

    /// Enable or disable the entity. Disabling removes it from every unit on the
    /// next update without destroying it; enabling admits it again.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<&mut Self> {
        let id = self.id;
        let entity = self.slot_mut();
        entity.check_destroyed("enable or disable")?;
        let is_enabled = entity.is_enabled();
        if is_enabled && !enabled {
            entity.flags &= !ENABLED;
            self.queue_evict();
        } else if !is_enabled && enabled {
            entity.flags |= ENABLED;
            if entity.flags & ADMITTING == 0 {
                entity.flags |= ADMITTING;
                self.table.to_admit.add(id);
            }
        }
        Ok(self)
    }

    /// Attach `component`, allocating its slot.
    pub fn add<S>(&mut self, component: &Component<S>) -> Result<&mut Self> {
        self.add_id(component.id())
    }

    /// Attach `component` and initialize its value.
    pub fn add_with<S: ComponentStore>(
        &mut self,
        component: &Component<S>,
        init: impl FnOnce(&mut S, EntityId),
    ) -> Result<&mut Self> {
        self.add(component)?;
        let id = self.id;
        init(self.components.get_mut(component), id);
        Ok(self)
    }

    /// Attach several components, queueing a single change.
    pub fn add_all(&mut self, components: &[ComponentId]) -> Result<&mut Self> {
        self.slot().check_destroyed("add components to")?;
        let mut changed = false;
        for &component in components {
            changed |= self.attach(component);
        }
        if changed {
            self.queue_change();
        }
        Ok(self)
    }

    pub fn add_id(&mut self, component: ComponentId) -> Result<&mut Self> {
        self.add_all(&[component])
    }

    /// Detach `component`, releasing its slot.
    pub fn remove<S>(&mut self, component: &Component<S>) -> Result<&mut Self> {
        self.remove_id(component.id())
    }

    pub fn remove_id(&mut self, component: ComponentId) -> Result<&mut Self> {
        self.slot().check_destroyed("remove components from")?;
        if self.detach(component) {
            self.queue_change();
        }
        Ok(self)
    }

    /// Ask every unit to re-check its interest on the next update.
    pub fn did_change(&mut self) -> Result<&mut Self> {
        self.slot().check_destroyed("signal change on")?;
        self.queue_change();
        Ok(self)
    }

    /// Destroy the entity. Idempotent; the id is recycled once eviction runs.
    pub fn destroy(&mut self) -> &mut Self {
        let entity = self.slot_mut();
        if !entity.is_destroyed() {
            entity.flags |= DESTROYED;
            self.queue_evict();
        }
        self
    }

    fn attach(&mut self, component: ComponentId) -> bool {
        let id = self.id;
        let entity = self.slot_mut();
        if entity.has_id(component) {
            return false;
        }
        entity.components.set(component.index());
        self.components.ensure_slot(component.index(), id);
        true
    }

    fn detach(&mut self, component: ComponentId) -> bool {
        let id = self.id;
        let entity = self.slot_mut();
        if !entity.has_id(component) {
            return false;
        }
        entity.components.clear(component.index());
        self.components.release_slot(component.index(), id);
        true
    }

    fn queue_change(&mut self) {
        let id = self.id;
        let entity = self.slot_mut();
        // picked up by admission instead
        if entity.flags & (ADDED | ENABLED) == 0 {
            return;
        }
        if entity.flags & CHANGING != 0 {
            return;
        }
        entity.flags |= CHANGING;
        self.table.to_change.add(id);
    }

    fn queue_evict(&mut self) {
        let id = self.id;
        let entity = self.slot_mut();
        if entity.flags & EVICTING != 0 {
            return;
        }
        entity.flags |= EVICTING;
        self.table.to_evict.add(id);
    }
}

/// Strip every component from a destroyed entity, releasing its slots.
pub(crate) fn release_components(entity: &mut Entity, components: &mut Components) {
    let id = entity.id;
    for bit in entity.components.ones() {
        components.release_slot(bit, id);
    }
    entity.components.clear_all();
}
