//! Unordered list of non-negative integers.
//!
//! Backs the world's free-id stack, its mutation queues and every unit's
//! active-entity set. Removal swaps the last element into the vacated index,
//! so positions are not stable across removals.

use std::fmt;

const DEFAULT_CAPACITY: usize = 16;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct IntList {
    elems: Vec<u32>,
}

impl IntList {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elems: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Element at `index`. Panics if out of range.
    #[inline]
    pub fn get(&self, index: usize) -> u32 {
        self.elems[index]
    }

    /// Linear scan.
    pub fn contains(&self, value: u32) -> bool {
        self.elems.contains(&value)
    }

    /// Append, growing by 1.5x + 1 when full.
    pub fn add(&mut self, value: u32) {
        let capacity = self.elems.capacity();
        if self.elems.len() == capacity {
            self.elems.reserve_exact(capacity / 2 + 1);
        }
        self.elems.push(value);
    }

    /// Remove the element at `index`, moving the last element into its place.
    pub fn remove_at(&mut self, index: usize) -> u32 {
        self.elems.swap_remove(index)
    }

    /// Remove the first occurrence of `value`, returning the index it vacated.
    pub fn remove(&mut self, value: u32) -> Option<usize> {
        let index = self.elems.iter().position(|&e| e == value)?;
        self.elems.swap_remove(index);
        Some(index)
    }

    pub fn remove_last(&mut self) -> Option<u32> {
        self.elems.pop()
    }

    /// Remove the oldest element. O(n); only used for FIFO queue draining.
    pub(crate) fn remove_first(&mut self) -> Option<u32> {
        if self.elems.is_empty() {
            None
        } else {
            Some(self.elems.remove(0))
        }
    }

    pub fn clear(&mut self) {
        self.elems.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.elems.iter().copied()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.elems
    }
}

impl fmt::Debug for IntList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.elems.iter()).finish()
    }
}

impl FromIterator<u32> for IntList {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut list = IntList::new();
        for value in iter {
            list.add(value);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_grows() {
        let mut list = IntList::with_capacity(0);
        for i in 0..100 {
            list.add(i);
        }
        assert_eq!(list.len(), 100);
        assert_eq!(list.get(42), 42);
        assert!(list.contains(99));
        assert!(!list.contains(100));
    }

    #[test]
    fn test_remove_swaps_last() {
        let mut list: IntList = [10, 20, 30, 40].into_iter().collect();
        assert_eq!(list.remove(20), Some(1));
        assert_eq!(list.as_slice(), &[10, 40, 30]);
        assert_eq!(list.remove(99), None);
        assert_eq!(list.remove_at(0), 10);
        assert_eq!(list.as_slice(), &[30, 40]);
    }

    #[test]
    fn test_remove_last_and_first() {
        let mut list: IntList = [1, 2, 3].into_iter().collect();
        assert_eq!(list.remove_last(), Some(3));
        assert_eq!(list.remove_first(), Some(1));
        assert_eq!(list.remove_last(), Some(2));
        assert_eq!(list.remove_last(), None);
        assert_eq!(list.remove_first(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut list: IntList = (0..5).collect();
        list.clear();
        assert!(list.is_empty());
        assert_eq!(format!("{list:?}"), "{}");
    }
}
