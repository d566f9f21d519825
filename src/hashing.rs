//! Hashing used by the simulation.
//!
//! `cell_index` gives every cell of the grid a dense, unique key and `mix` scrambles that key so
//! that neighboring cells do not land in neighboring buckets. `bucket_slot` combines the two.
//! Distinct cells may share a slot; callers must compare exact positions.
//!
//! The `hash_str` free function is used in `crate::random` to derive per-stream seeds.

use xxhash_rust::xxh3::xxh3_64;

use crate::grid::{Grid, Position};

/// A convenience method to compute the hash of a `&str`.
#[must_use]
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}

/// Row-major key `(x + k) * (2k + 1) + (y + k)` in `[0, (2k + 1)^2)`.
///
/// The caller guarantees `position` lies on `grid`.
#[must_use]
pub fn cell_index(position: Position, grid: &Grid) -> u32 {
    debug_assert!(grid.contains(position), "{position} is off the grid");
    let k = grid.bound();
    let column = (position.x + k).unsigned_abs();
    let row = (position.y + k).unsigned_abs();
    column * grid.side() + row
}

/// Integer avalanche mix.
#[must_use]
pub const fn mix(mut a: u32) -> u32 {
    a = (a ^ 61) ^ (a >> 16);
    a = a.wrapping_add(a << 3);
    a ^= a >> 4;
    a = a.wrapping_mul(0x27d4_eb2d);
    a ^= a >> 15;
    a
}

/// The bucket a position falls into when there are `slot_count` buckets.
#[must_use]
pub fn bucket_slot(position: Position, grid: &Grid, slot_count: usize) -> usize {
    mix(cell_index(position, grid)) as usize % slot_count
}
