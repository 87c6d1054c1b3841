//! Symbol frequency counting.
//!
//! A [`FrequencyTable`] maps every byte value to its occurrence count. Tables
//! merge by element-wise addition, so partial tables computed over disjoint
//! segments can be combined in any order.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::table::EncodingTable;

/// Occurrence count of each byte value.
#[derive(Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
}

impl FrequencyTable {
    /// Create a table with every count at zero.
    pub fn new() -> Self {
        Self { counts: [0; 256] }
    }

    /// Count every byte of `text`.
    pub fn from_bytes(text: &[u8]) -> Self {
        let mut table = Self::new();
        table.count(text);
        table
    }

    /// Add the bytes of `text` to the counts.
    pub fn count(&mut self, text: &[u8]) {
        for &byte in text {
            self.counts[byte as usize] += 1;
        }
    }

    /// Add `n` occurrences of `symbol`.
    pub fn add_count(&mut self, symbol: u8, n: u64) {
        self.counts[symbol as usize] += n;
    }

    /// Count for `symbol`.
    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Merge another table into this one.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for (count, &extra) in self.counts.iter_mut().zip(other.counts.iter()) {
            *count += extra;
        }
    }

    /// Iterate over `(symbol, count)` for symbols with a non-zero count,
    /// in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }

    /// Number of distinct symbols present.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    /// Total number of symbols counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// True if nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&count| count == 0)
    }

    /// Number of bits these symbols occupy when encoded with `table`:
    /// the sum of `code length * count` over all symbols.
    pub fn encoded_bits(&self, table: &EncodingTable) -> u64 {
        self.iter()
            .map(|(symbol, count)| table.get(symbol).len() as u64 * count)
            .sum()
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl AddAssign<&FrequencyTable> for FrequencyTable {
    fn add_assign(&mut self, rhs: &FrequencyTable) {
        self.merge(rhs);
    }
}

impl Add for FrequencyTable {
    type Output = FrequencyTable;

    fn add(mut self, rhs: FrequencyTable) -> FrequencyTable {
        self.merge(&rhs);
        self
    }
}

impl<'a> Sum<&'a FrequencyTable> for FrequencyTable {
    fn sum<I: Iterator<Item = &'a FrequencyTable>>(iter: I) -> Self {
        iter.fold(FrequencyTable::new(), |mut acc, part| {
            acc += part;
            acc
        })
    }
}

impl FromIterator<u8> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for byte in iter {
            table.add_count(byte, 1);
        }
        table
    }
}
