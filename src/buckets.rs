//! The spatial hash table of infected hosts.
//!
//! A `BucketStore` holds `N` chains. Each chain holds value snapshots of the infected hosts whose
//! position hashed to that slot when they were inserted. Because many cells share a slot, a slot
//! lookup only narrows the search; membership is always decided by comparing exact positions.
//!
//! Snapshots are only meaningful until the next `clear_all`.

use crate::grid::{Grid, Position};
use crate::hashing::bucket_slot;
use crate::hosts::{Host, HostId};

/// A copy of an infected host's identity and location at insertion time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HostSnapshot {
    pub id: HostId,
    pub position: Position,
}

impl From<&Host> for HostSnapshot {
    fn from(host: &Host) -> Self {
        HostSnapshot {
            id: host.id(),
            position: host.position,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BucketStore {
    grid: Grid,
    // Each chain is stored oldest first; iteration reverses it.
    slots: Vec<Vec<HostSnapshot>>,
    len: usize,
}

impl BucketStore {
    /// # Panics
    /// Panics if `slot_count` is zero.
    #[must_use]
    pub fn new(grid: Grid, slot_count: usize) -> Self {
        assert!(slot_count > 0, "a bucket store needs at least one slot");
        BucketStore {
            grid,
            slots: vec![Vec::new(); slot_count],
            len: 0,
        }
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Total number of snapshots across all slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn slot_for(&self, position: Position) -> usize {
        bucket_slot(position, &self.grid, self.slots.len())
    }

    /// Adds `snapshot` to the front of the chain at `slot`.
    ///
    /// # Panics
    /// Panics if `slot` is not less than `slot_count()`.
    pub fn insert(&mut self, slot: usize, snapshot: HostSnapshot) {
        self.slots[slot].push(snapshot);
        self.len += 1;
    }

    /// Inserts `host` into the slot of its current position.
    pub fn insert_host(&mut self, host: &Host) {
        let slot = self.slot_for(host.position);
        self.insert(slot, host.into());
    }

    /// Empties every slot. Allocated chain capacity is kept for the next rebuild.
    pub fn clear_all(&mut self) {
        for chain in &mut self.slots {
            chain.clear();
        }
        self.len = 0;
    }

    /// Entries of `slot`, most recently inserted first.
    ///
    /// # Panics
    /// Panics if `slot` is not less than `slot_count()`.
    pub fn chain(&self, slot: usize) -> impl Iterator<Item = &HostSnapshot> {
        self.slots[slot].iter().rev()
    }

    /// Returns true if any entry of `slot` stands exactly at `position`.
    ///
    /// # Panics
    /// Panics if `slot` is not less than `slot_count()`.
    #[must_use]
    pub fn contains_location(&self, slot: usize, position: Position) -> bool {
        self.chain(slot)
            .any(|snapshot| snapshot.position == position)
    }

    /// Returns true if some infected host was recorded at `position`.
    #[must_use]
    pub fn is_occupied(&self, position: Position) -> bool {
        self.contains_location(self.slot_for(position), position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: usize, x: i32, y: i32) -> HostSnapshot {
        HostSnapshot {
            id: HostId(id),
            position: Position::new(x, y),
        }
    }

    #[test]
    fn chains_are_most_recent_first() {
        let mut store = BucketStore::new(Grid::new(2), 4);
        store.insert(1, snapshot(0, 0, 0));
        store.insert(1, snapshot(1, 1, 0));
        store.insert(1, snapshot(2, 2, 0));

        let ids: Vec<HostId> = store.chain(1).map(|entry| entry.id).collect();
        assert_eq!(ids, vec![HostId(2), HostId(1), HostId(0)]);
        assert_eq!(store.len(), 3);
        assert_eq!(store.chain(0).count(), 0);
    }

    #[test]
    fn clear_all_empties_every_slot() {
        let mut store = BucketStore::new(Grid::new(2), 3);
        for slot in 0..3 {
            store.insert(slot, snapshot(slot, 0, 0));
        }
        store.clear_all();
        assert!(store.is_empty());
        for slot in 0..3 {
            assert!(!store.contains_location(slot, Position::ORIGIN));
        }
    }

    #[test]
    fn contains_location_requires_exact_match() {
        let mut store = BucketStore::new(Grid::new(2), 1);
        store.insert(0, snapshot(0, 1, 1));
        assert!(store.contains_location(0, Position::new(1, 1)));
        assert!(!store.contains_location(0, Position::new(1, 2)));
        assert!(!store.contains_location(0, Position::new(-1, 1)));
    }

    #[test]
    fn colliding_cells_are_told_apart() {
        let grid = Grid::new(1);
        let mut store = BucketStore::new(grid, 3);
        let occupied = Position::new(0, 0);
        let neighbor = Position::new(0, 1);
        assert_eq!(store.slot_for(occupied), store.slot_for(neighbor));

        store.insert_host(&Host::new(
            HostId(0),
            occupied,
            crate::hosts::InfectionStatus::NEWLY_INFECTED,
        ));
        assert!(store.is_occupied(occupied));
        assert!(!store.is_occupied(neighbor));
    }

    #[test]
    #[should_panic(expected = "at least one slot")]
    fn rejects_zero_slots() {
        let _ = BucketStore::new(Grid::new(1), 0);
    }
}
