//! Growable BitSet backed by a SmallVec<[u64; 2]>.
//! The first 128 bits live inline, so most entities never touch the heap for their masks.

use smallvec::{smallvec, SmallVec};

const WORD_BITS: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSet {
    words: SmallVec<[u64; 2]>,
}

impl BitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new BitSet capable of holding at least `capacity` bits.
    pub fn with_capacity(capacity: usize) -> Self {
        let num_words = capacity.div_ceil(WORD_BITS);
        Self {
            words: smallvec![0; num_words],
        }
    }

    /// Build a set from bit indices.
    pub fn from_bits<I: IntoIterator<Item = usize>>(bits: I) -> Self {
        let mut set = Self::new();
        for bit in bits {
            set.set(bit);
        }
        set
    }

    /// Set the bit at `index` to true.
    /// Resizes automatically if index is out of bounds.
    pub fn set(&mut self, index: usize) {
        let (word_idx, bit_idx) = (index / WORD_BITS, index % WORD_BITS);
        if word_idx >= self.words.len() {
            self.words.resize(word_idx + 1, 0);
        }
        self.words[word_idx] |= 1 << bit_idx;
    }

    /// Clear the bit at `index`. Out-of-range bits are already clear.
    pub fn clear(&mut self, index: usize) {
        let (word_idx, bit_idx) = (index / WORD_BITS, index % WORD_BITS);
        if let Some(word) = self.words.get_mut(word_idx) {
            *word &= !(1 << bit_idx);
        }
    }

    /// Clear every bit, keeping the allocated width.
    pub fn clear_all(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Check if the bit at `index` is set.
    pub fn contains(&self, index: usize) -> bool {
        let (word_idx, bit_idx) = (index / WORD_BITS, index % WORD_BITS);
        if word_idx >= self.words.len() {
            return false;
        }
        (self.words[word_idx] & (1 << bit_idx)) != 0
    }

    /// Overwrite this set with the contents of `other`.
    pub fn copy_from(&mut self, other: &BitSet) {
        if self.words.len() < other.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        let (head, tail) = self.words.split_at_mut(other.words.len());
        head.copy_from_slice(&other.words);
        tail.iter_mut().for_each(|w| *w = 0);
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if this set shares any set bits with `other`.
    pub fn intersects(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    /// Returns iterator over indices of set bits
    pub fn ones(&self) -> OnesIter<'_> {
        OnesIter {
            bitset: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

pub struct OnesIter<'a> {
    bitset: &'a BitSet,
    word_idx: usize,
    current_word: u64,
}

impl<'a> Iterator for OnesIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let trailing = self.current_word.trailing_zeros();
                self.current_word &= self.current_word - 1;
                return Some(self.word_idx * WORD_BITS + trailing as usize);
            }

            self.word_idx += 1;
            if self.word_idx >= self.bitset.words.len() {
                return None;
            }
            self.current_word = self.bitset.words[self.word_idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_grows_transparently() {
        let mut bits = BitSet::new();
        assert!(!bits.contains(300));
        bits.set(300);
        assert!(bits.contains(300));
        assert!(!bits.contains(299));
        bits.clear(300);
        assert!(!bits.contains(300));
        // clearing past the end is a no-op
        bits.clear(10_000);
    }

    #[test]
    fn test_copy_from_narrower() {
        let mut wide = BitSet::from_bits([1, 70, 200]);
        let narrow = BitSet::from_bits([3, 65]);
        wide.copy_from(&narrow);
        assert_eq!(wide.ones().collect::<Vec<_>>(), vec![3, 65]);
        assert_eq!(wide.count(), 2);
    }

    #[test]
    fn test_copy_from_wider() {
        let mut narrow = BitSet::new();
        narrow.copy_from(&BitSet::from_bits([0, 130]));
        assert!(narrow.contains(0));
        assert!(narrow.contains(130));
    }

    #[test]
    fn test_ones_and_intersects() {
        let a = BitSet::from_bits([0, 63, 64, 127]);
        assert_eq!(a.ones().collect::<Vec<_>>(), vec![0, 63, 64, 127]);
        assert!(a.intersects(&BitSet::from_bits([64])));
        assert!(!a.intersects(&BitSet::from_bits([5])));
        assert!(BitSet::with_capacity(256).is_empty());
    }
}
