use std::cell::Cell;

use crate::key::OpKey;
use crate::reference::Ref;

struct Entry {
    key: OpKey,
    value: Ref,
}

/// The computed table: a direct-mapped memo cache for synthesis results.
///
/// Each slot holds at most one `(key, result)` pair. There is no collision
/// chaining: inserts overwrite the slot unconditionally, and a lookup
/// answers only on an exact key match. The cache is advisory; discarding
/// its contents at any time changes performance, never results.
pub struct ComputedTable {
    slots: Vec<Option<Entry>>,
    size: u64,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl ComputedTable {
    /// Create a table with the given number of slots (a prime is
    /// recommended, so the modulo spreads keys evenly).
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "Computed table size must be positive");

        Self {
            slots: std::iter::repeat_with(|| None).take(size).collect(),
            size: size as u64,
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Number of lookups answered from the table.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    /// Number of lookups that fell through to recomputation.
    pub fn misses(&self) -> usize {
        self.misses.get()
    }

    /// Drop every entry. Hit/miss counters are kept.
    pub fn clear(&mut self) {
        self.slots.fill_with(|| None);
    }

    fn index(&self, key: &OpKey) -> usize {
        (key.hash() % self.size) as usize
    }

    /// Get the memoized result, if the slot holds exactly this key.
    pub fn get(&self, key: &OpKey) -> Option<Ref> {
        let index = self.index(key);
        match &self.slots[index] {
            Some(entry) if entry.key == *key => {
                self.hits.set(self.hits.get() + 1);
                Some(entry.value)
            }
            _ => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    /// Insert a result, overwriting whatever occupied the slot.
    pub fn insert(&mut self, key: OpKey, value: Ref) {
        let index = self.index(&key);
        self.slots[index] = Some(Entry { key, value });
    }
}
