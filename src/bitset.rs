use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// Number of elements a [`BitSet128`] can hold.
pub const CAPACITY: usize = 128;

const WORD_BITS: u8 = 32;

/// A fixed-capacity set of the integers `0..128`, stored as four 32-bit
/// words.
///
/// Sets are plain values: every operation takes its operands by value and
/// returns a new set. Element `e` lives in word `e / 32` at bit `e % 32`.
///
/// Passing an element outside `0..128` to any operation is a programming
/// error and panics.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BitSet128 {
    words: [u32; 4],
}

impl BitSet128 {
    /// Returns the empty set.
    pub const fn empty() -> Self {
        BitSet128 { words: [0; 4] }
    }

    /// Returns the set containing only `element`.
    pub fn new(element: u8) -> Self {
        Self::from_elements(&[element])
    }

    /// Returns the set containing every element of `elements`.
    pub fn from_elements(elements: &[u8]) -> Self {
        let mut set = Self::empty();
        for &element in elements {
            let (word, bit) = locate(element);
            set.words[word] |= 1 << bit;
        }
        set
    }

    pub fn union(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a | b)
    }

    pub fn intersection(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a & b)
    }

    /// Returns the elements present in exactly one of the two sets.
    ///
    /// Note that this is the *symmetric* difference. Use
    /// `a.intersection(b.negate())` to remove the elements of `b` from `a`.
    pub fn difference(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a ^ b)
    }

    /// Returns the complement of the set within `0..128`.
    pub fn negate(self) -> Self {
        BitSet128 { words: self.words.map(|w| !w) }
    }

    pub fn is_empty(self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn contains(self, element: u8) -> bool {
        !self.intersection(Self::new(element)).is_empty()
    }

    /// Number of elements in the set.
    pub fn len(self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns the lowest element of the set, or `None` if it is empty.
    pub fn smallest(self) -> Option<u8> {
        self.words.iter().enumerate().find(|&(_, &w)| w != 0).map(
            |(i, w)| i as u8 * WORD_BITS + w.trailing_zeros() as u8,
        )
    }

    /// Iterates the elements of the set in ascending order.
    pub fn iter(self) -> Iter {
        Iter { set: self }
    }

    fn zip_with(self, other: Self, f: impl Fn(u32, u32) -> u32) -> Self {
        let mut words = [0; 4];
        for (i, w) in words.iter_mut().enumerate() {
            *w = f(self.words[i], other.words[i]);
        }
        BitSet128 { words }
    }
}

fn locate(element: u8) -> (usize, u8) {
    assert!(
        (element as usize) < CAPACITY,
        "element {} is outside of the 0..{} range of BitSet128",
        element,
        CAPACITY
    );
    ((element / WORD_BITS) as usize, element % WORD_BITS)
}

/// Ascending iterator over the elements of a [`BitSet128`].
#[derive(Clone, Debug)]
pub struct Iter {
    set: BitSet128,
}

impl Iterator for Iter {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let smallest = self.set.smallest()?;
        let (word, bit) = locate(smallest);
        self.set.words[word] &= !(1 << bit);
        Some(smallest)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.set.len();
        (len, Some(len))
    }
}

impl ExactSizeIterator for Iter {}

impl IntoIterator for BitSet128 {
    type Item = u8;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter()
    }
}

impl FromIterator<u8> for BitSet128 {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, e| set | Self::new(e))
    }
}

impl BitOr for BitSet128 {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitAnd for BitSet128 {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl BitXor for BitSet128 {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        self.difference(rhs)
    }
}

impl Not for BitSet128 {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

impl fmt::Debug for BitSet128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
