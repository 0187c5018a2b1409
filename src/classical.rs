use smallvec::{smallvec, SmallVec};
use std::cmp::Ordering;
use std::fmt;

const WORD_BITS: usize = 64;

/// A definite bit-vector state, usable as a term of a superposition.
///
/// Bits are indexed from 0 (least significant) and the width is unbounded. Values are stored as
/// little-endian 64-bit words with no trailing zero words, so equal bit patterns are equal values.
///
/// # Example
/// ```
/// use qip_mixed::ClassicalState;
///
/// let c = ClassicalState::new(0b111);
/// assert_eq!(c.with_bit(1, false), ClassicalState::new(0b101));
/// assert!(c.with_bit(100, true).bit(100));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ClassicalState {
    words: SmallVec<[u64; 2]>,
}

impl ClassicalState {
    /// Make a state from a bitmask.
    pub fn new(mask: u64) -> Self {
        Self::from_words(smallvec![mask])
    }

    /// The all-zero state.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Make a state from bits given in order of index, starting at bit 0.
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut words: SmallVec<[u64; 2]> = smallvec![];
        for (i, bit) in bits.into_iter().enumerate() {
            let word = i / WORD_BITS;
            if words.len() <= word {
                words.resize(word + 1, 0);
            }
            if bit {
                words[word] |= 1 << (i % WORD_BITS);
            }
        }
        Self::from_words(words)
    }

    fn from_words(mut words: SmallVec<[u64; 2]>) -> Self {
        while words.last() == Some(&0) {
            words.pop();
        }
        Self { words }
    }

    /// Value of the bit at `index`.
    pub fn bit(&self, index: usize) -> bool {
        self.words
            .get(index / WORD_BITS)
            .map_or(false, |word| (word >> (index % WORD_BITS)) & 1 == 1)
    }

    /// The state with bit `index` set to `value` and all other bits unchanged.
    pub fn with_bit(&self, index: usize, value: bool) -> Self {
        if self.bit(index) == value {
            self.clone()
        } else {
            self.flip(index)
        }
    }

    /// The state with bit `index` inverted.
    pub fn flip(&self, index: usize) -> Self {
        let mut words = self.words.clone();
        let word = index / WORD_BITS;
        if words.len() <= word {
            words.resize(word + 1, 0);
        }
        words[word] ^= 1 << (index % WORD_BITS);
        Self::from_words(words)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Index of the highest set bit plus one, or 0 for the zero state.
    pub fn bit_len(&self) -> usize {
        match self.words.last() {
            Some(last) => {
                (self.words.len() - 1) * WORD_BITS + (WORD_BITS - last.leading_zeros() as usize)
            }
            None => 0,
        }
    }

    /// The bitmask, if it fits in a `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        match self.words.as_slice() {
            [] => Some(0),
            [w] => Some(*w),
            _ => None,
        }
    }

    fn as_u128(&self) -> Option<u128> {
        match self.words.as_slice() {
            [] => Some(0),
            [w] => Some(u128::from(*w)),
            [lo, hi] => Some(u128::from(*lo) | (u128::from(*hi) << WORD_BITS)),
            _ => None,
        }
    }
}

impl From<u64> for ClassicalState {
    fn from(mask: u64) -> Self {
        Self::new(mask)
    }
}

impl From<u128> for ClassicalState {
    fn from(mask: u128) -> Self {
        Self::from_words(smallvec![mask as u64, (mask >> WORD_BITS) as u64])
    }
}

impl Ord for ClassicalState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Canonical words: a longer vector is always the larger number.
        self.words
            .len()
            .cmp(&other.words.len())
            .then_with(|| self.words.iter().rev().cmp(other.words.iter().rev()))
    }
}

impl PartialOrd for ClassicalState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ClassicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.bit_len().max(8);
        write!(f, "|")?;
        for i in (0..width).rev() {
            write!(f, "{}", if self.bit(i) { '1' } else { '0' })?;
        }
        write!(f, ">")
    }
}

impl fmt::Debug for ClassicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_u128() {
            Some(mask) => write!(f, "ClassicalState({})", mask),
            None => {
                write!(f, "ClassicalState(0x")?;
                for word in self.words.iter().rev() {
                    write!(f, "{:016x}", word)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod classical_tests {
    use super::*;

    #[test]
    fn test_with_bit() {
        assert_eq!(ClassicalState::new(0).with_bit(0, true), ClassicalState::new(1));
        assert_eq!(ClassicalState::new(0).with_bit(0, false), ClassicalState::new(0));
        assert_eq!(ClassicalState::new(1).with_bit(0, true), ClassicalState::new(1));
        assert_eq!(ClassicalState::new(1).with_bit(0, false), ClassicalState::new(0));
        assert_eq!(ClassicalState::new(7).with_bit(1, false), ClassicalState::new(5));
        assert_eq!(ClassicalState::new(7).with_bit(1, true), ClassicalState::new(7));
    }

    #[test]
    fn test_bit() {
        let c = ClassicalState::new(0b1010);
        assert!(!c.bit(0));
        assert!(c.bit(1));
        assert!(!c.bit(2));
        assert!(c.bit(3));
        assert!(!c.bit(1000));
    }

    #[test]
    fn test_wide_bits_are_canonical() {
        let wide = ClassicalState::zero().with_bit(130, true);
        assert!(wide.bit(130));
        assert_eq!(wide.bit_len(), 131);
        assert_eq!(wide.as_u64(), None);
        assert_eq!(wide.with_bit(130, false), ClassicalState::zero());
        assert_eq!(wide.flip(130).as_u64(), Some(0));
    }

    #[test]
    fn test_from_bits() {
        let c = ClassicalState::from_bits([true, false, true, false, false]);
        assert_eq!(c, ClassicalState::new(0b101));
        assert_eq!(ClassicalState::from(0b101u128), c);
        assert_eq!(c.count_ones(), 2);
        assert_eq!(c.bit_len(), 3);
    }

    #[test]
    fn test_ordering() {
        let small = ClassicalState::new(u64::MAX);
        let big = ClassicalState::from(1u128 << 64);
        assert!(small < big);
        assert!(ClassicalState::new(2) > ClassicalState::new(1));
        assert!(ClassicalState::zero() < ClassicalState::new(1));
    }

    #[test]
    fn test_formatting() {
        let c = ClassicalState::new(5);
        assert_eq!(format!("{}", c), "|00000101>");
        assert_eq!(format!("{:?}", c), "ClassicalState(5)");
        assert_eq!(format!("{}", ClassicalState::new(0x1ff)), "|111111111>");
    }
}
