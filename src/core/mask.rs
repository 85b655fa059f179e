//! Label selection bitsets.
//!
//! Masks are keyed by the stable storage index of a label, so selection,
//! partitioning and vendor filtering reduce to word-wise bit operations.

use std::fmt;

const WORD_BITS: usize = 64;

/// Fixed-length bitset over label indices.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct LabelMask {
    len: usize,
    words: Vec<u64>,
}

impl LabelMask {
    /// Mask of `len` bits, all set to `value`.
    pub fn filled(len: usize, value: bool) -> Self {
        let fill = if value { u64::MAX } else { 0 };
        let mut mask = Self {
            len,
            words: vec![fill; len.div_ceil(WORD_BITS)],
        };
        mask.clear_tail();
        mask
    }

    /// Mask selecting every label.
    pub fn all(len: usize) -> Self {
        Self::filled(len, true)
    }

    /// Mask selecting nothing.
    pub fn none(len: usize) -> Self {
        Self::filled(len, false)
    }

    /// Build from a predicate over label indices.
    pub fn from_fn(len: usize, mut f: impl FnMut(usize) -> bool) -> Self {
        let mut mask = Self::none(len);
        for i in 0..len {
            if f(i) {
                mask.set(i, true);
            }
        }
        mask
    }

    /// Build from a boolean slice.
    pub fn from_bools(bits: &[bool]) -> Self {
        Self::from_fn(bits.len(), |i| bits[i])
    }

    /// Number of labels covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bit at `index`; out-of-range indices read as unset.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        index < self.len && (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Set the bit at `index`. Out-of-range indices are ignored.
    #[inline]
    pub fn set(&mut self, index: usize, value: bool) {
        if index >= self.len {
            return;
        }
        let bit = 1u64 << (index % WORD_BITS);
        if value {
            self.words[index / WORD_BITS] |= bit;
        } else {
            self.words[index / WORD_BITS] &= !bit;
        }
    }

    /// Logical AND. The result covers the shorter of the two masks.
    pub fn and(&self, other: &LabelMask) -> LabelMask {
        let len = self.len.min(other.len);
        let mut out = Self {
            len,
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a & b)
                .collect(),
        };
        out.words.truncate(len.div_ceil(WORD_BITS));
        out.clear_tail();
        out
    }

    /// Number of selected labels.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True if nothing is selected.
    pub fn is_clear(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Iterate selected indices in ascending order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.get(i))
    }

    /// Select the items at set positions.
    pub fn select<'a, T>(&'a self, items: &'a [T]) -> impl Iterator<Item = &'a T> + 'a {
        self.ones().filter_map(move |i| items.get(i))
    }

    fn clear_tail(&mut self) {
        let rem = self.len % WORD_BITS;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }
}

impl fmt::Debug for LabelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits: String = (0..self.len).map(|i| if self.get(i) { '1' } else { '0' }).collect();
        write!(f, "LabelMask({})", bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_counts() {
        assert_eq!(LabelMask::all(70).count(), 70);
        assert_eq!(LabelMask::none(70).count(), 0);
        assert_eq!(LabelMask::all(0).count(), 0);
        assert!(!LabelMask::all(3).get(3));
    }

    #[test]
    fn test_and() {
        let a = LabelMask::from_bools(&[true, true, false, true]);
        let b = LabelMask::from_bools(&[true, false, false, true]);
        assert_eq!(a.and(&b).ones().collect::<Vec<_>>(), vec![0, 3]);
        let wide = LabelMask::all(65).and(&LabelMask::all(70));
        assert_eq!(wide.len(), 65);
        assert_eq!(wide.count(), 65);
    }

    #[test]
    fn test_select() {
        let labels = ["a", "b", "c"];
        let mask = LabelMask::from_bools(&[false, true, true]);
        let picked: Vec<_> = mask.select(&labels).copied().collect();
        assert_eq!(picked, vec!["b", "c"]);
    }

    #[test]
    fn test_set_across_words() {
        let mut m = LabelMask::none(130);
        m.set(129, true);
        m.set(64, true);
        m.set(500, true);
        assert_eq!(m.ones().collect::<Vec<_>>(), vec![64, 129]);
        m.set(64, false);
        assert_eq!(m.count(), 1);
    }
}
