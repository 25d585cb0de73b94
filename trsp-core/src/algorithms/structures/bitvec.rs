//! A tweaked version of `BitVec` from `probabilistic-collections` crate.

#[cfg(test)]
#[path = "../../../tests/unit/algorithms/structures/bitvec_test.rs"]
mod bitvec_test;

use std::fmt::Display;
use std::ops::Index;

/// A fixed size set of flags stored as bits, used to describe skills and tools.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitVec {
    blocks: Vec<u8>,
    length: usize,
}

const BITS_IN_BLOCK: usize = std::mem::size_of::<u8>() * 8;

impl BitVec {
    /// Creates a new instance of `BitVec` with all bits unset.
    pub fn new(length: usize) -> Self {
        let block_count = length.div_ceil(BITS_IN_BLOCK);
        Self { blocks: vec![0; block_count], length }
    }

    /// Creates a new instance of `BitVec` with all bits set.
    pub fn new_full(length: usize) -> Self {
        let mut bits = Self::new(length);
        (0..length).for_each(|index| bits.set(index, true));

        bits
    }

    /// Creates a new instance of `BitVec` with the bits from given indices set.
    pub fn from_indices(length: usize, indices: &[usize]) -> Self {
        let mut bits = Self::new(length);
        indices.iter().for_each(|&index| bits.set(index, true));

        bits
    }

    /// Sets the bit at given index.
    pub fn set(&mut self, index: usize, bit: bool) {
        assert!(index < self.length);
        let block_index = index / BITS_IN_BLOCK;
        let bit_index = index % BITS_IN_BLOCK;
        let mask = 1 << bit_index;

        if bit {
            self.blocks[block_index] |= mask;
        } else {
            self.blocks[block_index] &= !mask;
        }
    }

    /// Returns the bit at given index or `None` if the index is out of bounds.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.length {
            return None;
        }

        self.blocks.get(index / BITS_IN_BLOCK).map(|block| ((block >> (index % BITS_IN_BLOCK)) & 1) != 0)
    }

    /// Checks whether every bit set in this vector is also set in another one.
    pub fn is_subset(&self, other: &Self) -> bool {
        assert_eq!(self.length, other.length, "bit vectors must have the same length");

        self.blocks.iter().zip(other.blocks.iter()).all(|(x, y)| x & !y == 0)
    }

    /// Returns indices of all set bits.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.length).filter(move |&index| self[index])
    }

    /// Returns amount of bits.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Checks whether there are no bits.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl Index<usize> for BitVec {
    type Output = bool;

    fn index(&self, index: usize) -> &bool {
        if self.get(index).expect("index out of bounds.") { &true } else { &false }
    }
}

impl Display for BitVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits = (0..self.length).map(|index| if self[index] { '1' } else { '0' }).collect::<String>();
        write!(f, "[{bits}]")
    }
}
