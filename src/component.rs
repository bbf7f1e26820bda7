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

//! Component stores and the per-world store registry
//!
//! A store holds the values of one component for *every* entity that has it,
//! in a sparse block arena indexed by entity id. Units read and write stores
//! by id inside their update loops, which keeps access to a shift, a mask and
//! an index.
//!
//! Accessors assume the entity currently has the component (its bit is set).
//! That is not checked in release builds.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::ops::AddAssign;

use glam::Vec2;

use crate::entity::EntityId;
use crate::storage::{Blocks, INDEX_BLOCKS};

/// Component ID (bit position in every entity's component mask)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

impl ComponentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Storage contract shared by every store variant.
pub trait ComponentStore: Any {
    /// Allocate the slot for `id` if its block does not exist yet.
    fn ensure_slot(&mut self, id: EntityId);

    /// Called when `id` loses the component. Value stores leave stale data behind.
    fn release_slot(&mut self, _id: EntityId) {}

    /// Grow the block index to at least `blocks` entries.
    fn reserve_blocks(&mut self, blocks: usize);

    /// Short variant name for diagnostics.
    fn kind(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

macro_rules! impl_any {
    () => {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    };
}

/// Typed handle to a registered store.
pub struct Component<S> {
    id: ComponentId,
    _store: PhantomData<fn() -> S>,
}

impl<S> Component<S> {
    pub(crate) fn new(id: ComponentId) -> Self {
        Self {
            id,
            _store: PhantomData,
        }
    }

    #[inline]
    pub fn id(&self) -> ComponentId {
        self.id
    }
}

impl<S> Clone for Component<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Component<S> {}

impl<S> PartialEq for Component<S> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S> fmt::Debug for Component<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.id.0)
    }
}

/// Release hook run on a boxed value when its entity loses the component.
pub type ReleaseHook<T> = Box<dyn FnMut(T)>;

/// Store for arbitrary owned values.
pub struct GenericStore<T: 'static> {
    blocks: Blocks<Option<T>>,
    release: Option<ReleaseHook<T>>,
}

impl<T: 'static> GenericStore<T> {
    pub fn new() -> Self {
        Self {
            blocks: Blocks::new(INDEX_BLOCKS, 1),
            release: None,
        }
    }

    /// Hand released values to `hook` (e.g. to return them to a pool) instead of dropping them.
    pub fn with_release(hook: impl FnMut(T) + 'static) -> Self {
        Self {
            blocks: Blocks::new(INDEX_BLOCKS, 1),
            release: Some(Box::new(hook)),
        }
    }

    /// `None` until a value has been set for `id`.
    ///
    /// # Safety
    ///
    /// `id` must have this component attached (or restored). Reading or
    /// writing an id whose slot was never allocated is undefined behavior;
    /// debug builds catch it with an assertion.
    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.blocks.at(id, 0).as_ref()
    }

    /// # Safety
    ///
    /// Same contract as [`get`](Self::get): `id` must have this component.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.blocks.at_mut(id, 0).as_mut()
    }

    /// Store `value` for `id`, returning the previous value. The release hook is not run.
    ///
    /// # Safety
    ///
    /// Same contract as [`get`](Self::get): `id` must have this component.
    #[inline]
    pub fn set(&mut self, id: EntityId, value: T) -> Option<T> {
        self.blocks.at_mut(id, 0).replace(value)
    }
}

impl<T: 'static> Default for GenericStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> ComponentStore for GenericStore<T> {
    fn ensure_slot(&mut self, id: EntityId) {
        self.blocks.ensure(id, || None);
    }

    fn release_slot(&mut self, id: EntityId) {
        if let Some(value) = self.blocks.at_mut(id, 0).take() {
            if let Some(release) = self.release.as_mut() {
                release(value);
            }
        }
    }

    fn reserve_blocks(&mut self, blocks: usize) {
        self.blocks.reserve(blocks);
    }

    fn kind(&self) -> &'static str {
        "generic"
    }

    impl_any!();
}

/// Plain numeric value that can live in a [`ScalarStore`].
pub trait Scalar: Copy + Default + AddAssign + 'static {}

impl<T: Copy + Default + AddAssign + 'static> Scalar for T {}

/// Store for one number per entity.
pub struct ScalarStore<T: Scalar> {
    blocks: Blocks<T>,
}

/// 32-bit integer store.
pub type IntStore = ScalarStore<i32>;

/// 32-bit float store.
pub type FloatStore = ScalarStore<f32>;

impl<T: Scalar> ScalarStore<T> {
    pub fn new() -> Self {
        Self {
            blocks: Blocks::new(INDEX_BLOCKS, 1),
        }
    }

    /// # Safety
    ///
    /// `id` must have this component attached (or restored). Reading or
    /// writing an id whose slot was never allocated is undefined behavior;
    /// debug builds catch it with an assertion.
    #[inline]
    pub fn get(&self, id: EntityId) -> T {
        *self.blocks.at(id, 0)
    }

    /// # Safety
    ///
    /// `id` must have this component attached (or restored). Reading or
    /// writing an id whose slot was never allocated is undefined behavior;
    /// debug builds catch it with an assertion.
    #[inline]
    pub fn set(&mut self, id: EntityId, value: T) {
        *self.blocks.at_mut(id, 0) = value;
    }

    /// Add `delta` to the value for `id`.
    ///
    /// # Safety
    ///
    /// Same contract as [`get`](Self::get): `id` must have this component.
    #[inline]
    pub fn add(&mut self, id: EntityId, delta: T) {
        *self.blocks.at_mut(id, 0) += delta;
    }
}

impl<T: Scalar> Default for ScalarStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> ComponentStore for ScalarStore<T> {
    fn ensure_slot(&mut self, id: EntityId) {
        self.blocks.ensure(id, T::default);
    }

    fn reserve_blocks(&mut self, blocks: usize) {
        self.blocks.reserve(blocks);
    }

    fn kind(&self) -> &'static str {
        "scalar"
    }

    impl_any!();
}

/// Store for an x/y pair of floats, packed as two consecutive floats per entity.
pub struct XyStore {
    blocks: Blocks<f32>,
}

impl XyStore {
    pub fn new() -> Self {
        Self {
            blocks: Blocks::new(INDEX_BLOCKS, 2),
        }
    }

    /// # Safety
    ///
    /// `id` must have this component attached (or restored). Reading or
    /// writing an id whose slot was never allocated is undefined behavior;
    /// debug builds catch it with an assertion.
    #[inline]
    pub fn get_x(&self, id: EntityId) -> f32 {
        *self.blocks.at(id, 0)
    }

    /// # Safety
    ///
    /// Same contract as [`get_x`](Self::get_x): `id` must have this component.
    #[inline]
    pub fn get_y(&self, id: EntityId) -> f32 {
        *self.blocks.at(id, 1)
    }

    /// # Safety
    ///
    /// Same contract as [`get_x`](Self::get_x): `id` must have this component.
    #[inline]
    pub fn get(&self, id: EntityId) -> Vec2 {
        Vec2::new(self.get_x(id), self.get_y(id))
    }

    /// # Safety
    ///
    /// `id` must have this component attached (or restored). Reading or
    /// writing an id whose slot was never allocated is undefined behavior;
    /// debug builds catch it with an assertion.
    #[inline]
    pub fn set_x(&mut self, id: EntityId, x: f32) {
        *self.blocks.at_mut(id, 0) = x;
    }

    /// # Safety
    ///
    /// Same contract as [`set_x`](Self::set_x): `id` must have this component.
    #[inline]
    pub fn set_y(&mut self, id: EntityId, y: f32) {
        *self.blocks.at_mut(id, 1) = y;
    }

    /// # Safety
    ///
    /// Same contract as [`set_x`](Self::set_x): `id` must have this component.
    #[inline]
    pub fn set(&mut self, id: EntityId, x: f32, y: f32) {
        self.set_x(id, x);
        self.set_y(id, y);
    }

    /// # Safety
    ///
    /// Same contract as [`set_x`](Self::set_x): `id` must have this component.
    #[inline]
    pub fn set_vec(&mut self, id: EntityId, value: Vec2) {
        self.set(id, value.x, value.y);
    }

    /// Add `dx`/`dy` to the pair for `id`.
    ///
    /// # Safety
    ///
    /// Same contract as [`set_x`](Self::set_x): `id` must have this component.
    #[inline]
    pub fn add(&mut self, id: EntityId, dx: f32, dy: f32) {
        *self.blocks.at_mut(id, 0) += dx;
        *self.blocks.at_mut(id, 1) += dy;
    }

    /// Copy the pair for `id` out of `other`.
    ///
    /// # Safety
    ///
    /// Same contract as [`get`](Self::get): `id` must have this component.
    #[inline]
    pub fn copy_from(&mut self, id: EntityId, other: &XyStore) {
        self.set_vec(id, other.get(id));
    }
}

impl Default for XyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentStore for XyStore {
    fn ensure_slot(&mut self, id: EntityId) {
        self.blocks.ensure(id, || 0.0);
    }

    fn reserve_blocks(&mut self, blocks: usize) {
        self.blocks.reserve(blocks);
    }

    fn kind(&self) -> &'static str {
        "xy"
    }

    impl_any!();
}

/// Store for a 32-bit flag word per entity.
pub struct MaskStore {
    blocks: Blocks<u32>,
}

impl MaskStore {
    pub fn new() -> Self {
        Self {
            blocks: Blocks::new(INDEX_BLOCKS, 1),
        }
    }

    /// # Safety
    ///
    /// `id` must have this component attached (or restored). Reading or
    /// writing an id whose slot was never allocated is undefined behavior;
    /// debug builds catch it with an assertion.
    #[inline]
    pub fn get(&self, id: EntityId) -> u32 {
        *self.blocks.at(id, 0)
    }

    /// # Safety
    ///
    /// `id` must have this component attached (or restored). Reading or
    /// writing an id whose slot was never allocated is undefined behavior;
    /// debug builds catch it with an assertion.
    #[inline]
    pub fn set(&mut self, id: EntityId, mask: u32) {
        *self.blocks.at_mut(id, 0) = mask;
    }

    /// `value &= mask`
    ///
    /// # Safety
    ///
    /// Same contract as [`set`](Self::set): `id` must have this component.
    #[inline]
    pub fn and(&mut self, id: EntityId, mask: u32) {
        *self.blocks.at_mut(id, 0) &= mask;
    }

    /// `value |= mask`
    ///
    /// # Safety
    ///
    /// Same contract as [`set`](Self::set): `id` must have this component.
    #[inline]
    pub fn or(&mut self, id: EntityId, mask: u32) {
        *self.blocks.at_mut(id, 0) |= mask;
    }

    /// True if any bit of `flag` is set for `id`.
    ///
    /// # Safety
    ///
    /// Same contract as [`get`](Self::get): `id` must have this component.
    #[inline]
    pub fn is_set(&self, id: EntityId, flag: u32) -> bool {
        self.get(id) & flag != 0
    }

    /// # Safety
    ///
    /// Same contract as [`set`](Self::set): `id` must have this component.
    #[inline]
    pub fn set_flag(&mut self, id: EntityId, flag: u32) {
        self.or(id, flag);
    }

    /// # Safety
    ///
    /// Same contract as [`set`](Self::set): `id` must have this component.
    #[inline]
    pub fn clear_flag(&mut self, id: EntityId, flag: u32) {
        self.and(id, !flag);
    }
}

impl Default for MaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentStore for MaskStore {
    fn ensure_slot(&mut self, id: EntityId) {
        self.blocks.ensure(id, || 0);
    }

    fn reserve_blocks(&mut self, blocks: usize) {
        self.blocks.reserve(blocks);
    }

    fn kind(&self) -> &'static str {
        "mask"
    }

    impl_any!();
}

/// All stores registered with a world, indexed by [`ComponentId`].
pub struct Components {
    stores: Vec<Box<dyn ComponentStore>>,
    index_blocks: usize,
}

impl Components {
    pub(crate) fn new(index_blocks: usize) -> Self {
        Self {
            stores: Vec::new(),
            index_blocks,
        }
    }

    pub(crate) fn register<S: ComponentStore>(&mut self, mut store: S) -> Component<S> {
        store.reserve_blocks(self.index_blocks);
        let id = ComponentId(self.stores.len() as u32);
        self.stores.push(Box::new(store));
        Component::new(id)
    }

    /// Borrow the store behind `handle`, or `None` if it belongs to another world.
    pub fn try_get<S: ComponentStore>(&self, handle: &Component<S>) -> Option<&S> {
        self.stores
            .get(handle.id.index())?
            .as_any()
            .downcast_ref::<S>()
    }

    pub fn try_get_mut<S: ComponentStore>(&mut self, handle: &Component<S>) -> Option<&mut S> {
        self.stores
            .get_mut(handle.id.index())?
            .as_any_mut()
            .downcast_mut::<S>()
    }

    /// Borrow the store behind `handle`.
    ///
    /// # Panics
    /// Panics if `handle` was issued by a different world.
    #[track_caller]
    pub fn get<S: ComponentStore>(&self, handle: &Component<S>) -> &S {
        match self.try_get(handle) {
            Some(store) => store,
            None => panic!("{handle:?} is not registered with this world"),
        }
    }

    /// Mutably borrow the store behind `handle`.
    ///
    /// # Panics
    /// Panics if `handle` was issued by a different world.
    #[track_caller]
    pub fn get_mut<S: ComponentStore>(&mut self, handle: &Component<S>) -> &mut S {
        match self.try_get_mut(handle) {
            Some(store) => store,
            None => panic!("{handle:?} is not registered with this world"),
        }
    }

    /// Copy the pair for `id` from `src` into `dst`.
    ///
    /// # Panics
    /// Panics if either handle was issued by a different world.
    #[track_caller]
    pub fn copy_xy(&mut self, dst: &Component<XyStore>, src: &Component<XyStore>, id: EntityId) {
        if dst == src {
            return;
        }
        let value = self.get(src).get(id);
        self.get_mut(dst).set_vec(id, value);
    }

    /// Mutably borrow two different stores at once.
    ///
    /// # Panics
    /// Panics if both handles name the same store, or if either was issued by
    /// a different world.
    #[track_caller]
    pub fn pair_mut<A: ComponentStore, B: ComponentStore>(
        &mut self,
        a: &Component<A>,
        b: &Component<B>,
    ) -> (&mut A, &mut B) {
        let (ia, ib) = (a.id.index(), b.id.index());
        assert_ne!(ia, ib, "pair_mut needs two distinct stores");
        assert!(
            ia.max(ib) < self.stores.len(),
            "{a:?}/{b:?} not registered with this world"
        );

        let (lo, hi) = self.stores.split_at_mut(ia.max(ib));
        let (low, high) = (&mut lo[ia.min(ib)], &mut hi[0]);
        let (sa, sb) = if ia < ib { (low, high) } else { (high, low) };
        match (
            sa.as_any_mut().downcast_mut::<A>(),
            sb.as_any_mut().downcast_mut::<B>(),
        ) {
            (Some(sa), Some(sb)) => (sa, sb),
            _ => panic!("{a:?}/{b:?} not registered with this world"),
        }
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Variant name of the store at `id`.
    pub fn kind(&self, id: ComponentId) -> Option<&'static str> {
        self.stores.get(id.index()).map(|s| s.kind())
    }

    pub(crate) fn ensure_slot(&mut self, component: usize, id: EntityId) {
        self.stores[component].ensure_slot(id);
    }

    pub(crate) fn release_slot(&mut self, component: usize, id: EntityId) {
        self.stores[component].release_slot(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_scalar_stores() {
        let mut ints = IntStore::new();
        ints.ensure_slot(3);
        ints.set(3, 10);
        ints.add(3, 5);
        assert_eq!(ints.get(3), 15);

        let mut floats = FloatStore::new();
        floats.ensure_slot(1000);
        floats.set(1000, 1.5);
        floats.add(1000, 0.25);
        assert_eq!(floats.get(1000), 1.75);
    }

    #[test]
    fn test_xy_store() {
        let mut pos = XyStore::new();
        pos.ensure_slot(7);
        pos.set(7, 3.0, 4.0);
        assert_eq!(pos.get_x(7), 3.0);
        assert_eq!(pos.get_y(7), 4.0);
        pos.add(7, 1.0, -1.0);
        assert_eq!(pos.get(7), Vec2::new(4.0, 3.0));

        // neighbouring slot is untouched
        assert_eq!(pos.get(8), Vec2::ZERO);

        let mut old = XyStore::new();
        old.ensure_slot(7);
        old.copy_from(7, &pos);
        assert_eq!(old.get(7), Vec2::new(4.0, 3.0));
    }

    #[test]
    fn test_mask_store() {
        const BURNING: u32 = 1 << 0;
        const FROZEN: u32 = 1 << 3;

        let mut status = MaskStore::new();
        status.ensure_slot(0);
        status.set_flag(0, BURNING);
        status.set_flag(0, FROZEN);
        assert!(status.is_set(0, BURNING));
        status.clear_flag(0, BURNING);
        assert!(!status.is_set(0, BURNING));
        assert_eq!(status.get(0), FROZEN);
        status.or(0, 0b11);
        status.and(0, 0b10);
        assert_eq!(status.get(0), 0b10);
    }

    #[test]
    fn test_generic_release_hook() {
        let pool = Rc::new(RefCell::new(Vec::new()));
        let sink = pool.clone();
        let mut names = GenericStore::with_release(move |name: String| sink.borrow_mut().push(name));

        names.ensure_slot(2);
        assert!(names.get(2).is_none());
        assert_eq!(names.set(2, "ship".to_string()), None);
        assert_eq!(names.get(2).map(String::as_str), Some("ship"));

        names.release_slot(2);
        assert!(names.get(2).is_none());
        assert_eq!(*pool.borrow(), vec!["ship".to_string()]);

        // releasing an empty slot does not call the hook
        names.release_slot(2);
        assert_eq!(pool.borrow().len(), 1);
    }

    #[test]
    fn test_registry_handles() {
        let mut components = Components::new(INDEX_BLOCKS);
        let pos = components.register(XyStore::new());
        let vel = components.register(XyStore::new());
        let hp = components.register(IntStore::new());
        assert_eq!(pos.id(), ComponentId(0));
        assert_eq!(hp.id(), ComponentId(2));
        assert_eq!(components.kind(hp.id()), Some("scalar"));

        components.ensure_slot(pos.id().index(), 4);
        components.ensure_slot(vel.id().index(), 4);
        components.get_mut(&vel).set(4, 2.0, 1.0);
        components.copy_xy(&pos, &vel, 4);
        assert_eq!(components.get(&pos).get(4), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_pair_mut_borrows_both_stores() {
        let mut components = Components::new(INDEX_BLOCKS);
        let pos = components.register(XyStore::new());
        let hp = components.register(IntStore::new());
        components.ensure_slot(pos.id().index(), 1);
        components.ensure_slot(hp.id().index(), 1);

        // handles in either order
        let (hp_store, pos_store) = components.pair_mut(&hp, &pos);
        hp_store.set(1, 3);
        pos_store.set(1, hp_store.get(1) as f32, 1.0);
        assert_eq!(components.get(&pos).get(1), Vec2::new(3.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "distinct")]
    fn test_pair_mut_same_store_panics() {
        let mut components = Components::new(INDEX_BLOCKS);
        let pos = components.register(XyStore::new());
        let _ = components.pair_mut(&pos, &pos);
    }

    #[test]
    fn test_foreign_handle_is_rejected() {
        let mut components = Components::new(INDEX_BLOCKS);
        components.register(IntStore::new());
        let foreign: Component<XyStore> = Component::new(ComponentId(0));
        assert!(components.try_get(&foreign).is_none());
        assert!(components.try_get(&Component::<XyStore>::new(ComponentId(9))).is_none());
    }
}
