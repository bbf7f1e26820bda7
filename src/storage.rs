//! Block arena shared by every component store.
//!
//! Slots for entity ids `[b * BLOCK, (b + 1) * BLOCK)` live in block `b`.
//! Blocks are allocated lazily the first time an id inside them is
//! initialized and are never freed individually. A store keeps `lanes`
//! values per entity (2 for packed x/y pairs).
//!
//! Slot access is unchecked in release builds. The world only sets a
//! component bit after [`Blocks::ensure`] ran for that id, so accessing a
//! slot whose bit is set is always in bounds; accessing any other slot is a
//! caller-contract violation. Debug builds assert the contract instead.

use crate::entity::EntityId;

/// Slots per block.
pub const BLOCK: usize = 1 << BLOCK_SHIFT;
/// `id >> BLOCK_SHIFT` selects the block.
pub const BLOCK_SHIFT: u32 = 8;
/// `id & BLOCK_MASK` selects the slot within the block.
pub const BLOCK_MASK: usize = BLOCK - 1;
/// Default length of the block index before it first doubles.
pub const INDEX_BLOCKS: usize = 32;

pub(crate) struct Blocks<T> {
    index: Vec<Option<Box<[T]>>>,
    lanes: usize,
}

impl<T> Blocks<T> {
    pub(crate) fn new(index_blocks: usize, lanes: usize) -> Self {
        let mut index = Vec::new();
        index.resize_with(index_blocks.max(1), || None);
        Self { index, lanes }
    }

    #[inline]
    fn locate(&self, id: EntityId, lane: usize) -> (usize, usize) {
        let id = id as usize;
        (id >> BLOCK_SHIFT, (id & BLOCK_MASK) * self.lanes + lane)
    }

    /// Make sure the block holding `id` exists, filling a fresh block with `fill()`.
    pub(crate) fn ensure(&mut self, id: EntityId, mut fill: impl FnMut() -> T) {
        let block = (id as usize) >> BLOCK_SHIFT;
        if block >= self.index.len() {
            let mut len = self.index.len();
            while block >= len {
                len *= 2;
            }
            self.index.resize_with(len, || None);
        }
        let lanes = self.lanes;
        let slot = &mut self.index[block];
        if slot.is_none() {
            *slot = Some((0..BLOCK * lanes).map(|_| fill()).collect());
        }
    }

    /// Grow the block index to at least `blocks` entries without allocating blocks.
    pub(crate) fn reserve(&mut self, blocks: usize) {
        if blocks > self.index.len() {
            self.index.resize_with(blocks, || None);
        }
    }

    pub(crate) fn is_allocated(&self, id: EntityId) -> bool {
        self.index
            .get((id as usize) >> BLOCK_SHIFT)
            .is_some_and(|b| b.is_some())
    }

    /// Number of blocks that have been allocated.
    pub(crate) fn allocated_blocks(&self) -> usize {
        self.index.iter().filter(|b| b.is_some()).count()
    }

    pub(crate) fn index_len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub(crate) fn at(&self, id: EntityId, lane: usize) -> &T {
        debug_assert!(lane < self.lanes);
        debug_assert!(
            self.is_allocated(id),
            "component slot for entity {id} was never initialized"
        );
        let (block, slot) = self.locate(id, lane);
        // SAFETY: the block for `id` was allocated by `ensure` (see module docs).
        unsafe {
            self.index
                .get_unchecked(block)
                .as_deref()
                .unwrap_unchecked()
                .get_unchecked(slot)
        }
    }

    #[inline]
    pub(crate) fn at_mut(&mut self, id: EntityId, lane: usize) -> &mut T {
        debug_assert!(lane < self.lanes);
        debug_assert!(
            self.is_allocated(id),
            "component slot for entity {id} was never initialized"
        );
        let (block, slot) = self.locate(id, lane);
        // SAFETY: see `at`.
        unsafe {
            self.index
                .get_unchecked_mut(block)
                .as_deref_mut()
                .unwrap_unchecked()
                .get_unchecked_mut(slot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_block_allocation() {
        let mut blocks: Blocks<i32> = Blocks::new(2, 1);
        assert!(!blocks.is_allocated(0));
        blocks.ensure(5, || 0);
        assert!(blocks.is_allocated(5));
        assert!(blocks.is_allocated(255));
        assert!(!blocks.is_allocated(256));
        assert_eq!(blocks.allocated_blocks(), 1);

        *blocks.at_mut(5, 0) = 9;
        assert_eq!(*blocks.at(5, 0), 9);
        assert_eq!(*blocks.at(6, 0), 0);
    }

    #[test]
    fn test_index_doubles() {
        let mut blocks: Blocks<f32> = Blocks::new(2, 1);
        blocks.ensure(10 * BLOCK as u32, || 0.0);
        assert_eq!(blocks.index_len(), 16);
        assert_eq!(blocks.allocated_blocks(), 1);
    }

    #[test]
    fn test_lanes_are_interleaved() {
        let mut blocks: Blocks<f32> = Blocks::new(1, 2);
        blocks.ensure(1, || 0.0);
        *blocks.at_mut(1, 0) = 1.0;
        *blocks.at_mut(1, 1) = 2.0;
        assert_eq!(*blocks.at(0, 1), 0.0);
        assert_eq!(*blocks.at(1, 0), 1.0);
        assert_eq!(*blocks.at(1, 1), 2.0);
        assert_eq!(*blocks.at(2, 0), 0.0);
    }
}
