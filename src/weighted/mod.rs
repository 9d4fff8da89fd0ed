//! Weighted random selection over a pool of entries.
//!
//! A `WeightedPool` is a draw table, not a reuse registry. A typical
//! caller draws a kind here, then requests a member of that kind from
//! the [`PoolManager`](crate::manager::PoolManager).

use rand::Rng;
use serde::{Deserialize, Serialize};

/// One drawable item and its weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedEntry<T> {
    item: T,
    weight: u32,
}

impl<T> WeightedEntry<T> {
    /// Create an entry with the given weight.
    pub fn new(item: T, weight: u32) -> Self {
        Self { item, weight }
    }

    /// The entry's item.
    #[inline]
    pub fn item(&self) -> &T {
        &self.item
    }

    /// The entry's weight. Zero-weight entries are never drawn.
    #[inline]
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Change the entry's weight.
    pub fn set_weight(&mut self, weight: u32) {
        self.weight = weight;
    }
}

/// A pool of items drawn by weighted chance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedPool<T> {
    entries: Vec<WeightedEntry<T>>,
}

impl<T> WeightedPool<T> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an item with the given weight.
    pub fn push(&mut self, item: T, weight: u32) {
        self.entries.push(WeightedEntry::new(item, weight));
    }

    /// Number of entries in the pool.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the pool has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// View of the entries, in insertion order.
    pub fn entries(&self) -> &[WeightedEntry<T>] {
        &self.entries
    }

    /// Total weight across all entries.
    pub fn total_weight(&self) -> u64 {
        self.entries.iter().map(|e| e.weight as u64).sum()
    }

    /// Draw an item using the thread-local RNG.
    ///
    /// Returns `None` if the pool is empty or every weight is zero.
    pub fn draw(&self) -> Option<&T> {
        self.draw_with(&mut rand::thread_rng())
    }

    /// Draw an item using the provided RNG.
    ///
    /// Walks the entries in insertion order, subtracting each weight
    /// from a roll in `0..total_weight`; the entry that brings the roll
    /// below its weight wins.
    pub fn draw_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }

        let mut roll = rng.gen_range(0..total);
        for entry in &self.entries {
            let weight = entry.weight as u64;
            if roll < weight {
                return Some(&entry.item);
            }
            roll -= weight;
        }

        None
    }
}

impl<T> Default for WeightedPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(T, u32)> for WeightedPool<T> {
    fn from_iter<I: IntoIterator<Item = (T, u32)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(item, weight)| WeightedEntry::new(item, weight))
                .collect(),
        }
    }
}
