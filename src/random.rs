//! Named, independently seeded random number streams.
//!
//! Every stream derives its seed from the run's base seed plus a hash of the stream's name, so
//! two runs with the same base seed draw identical sequences, and draws on one stream never shift
//! the draws of another.

use log::trace;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::hashing::hash_str;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RngStream {
    /// Initial host positions.
    Placement,
    /// Per-round movement directions.
    Movement,
}

impl RngStream {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            RngStream::Placement => "PlacementRng",
            RngStream::Movement => "MovementRng",
        }
    }

    /// Creates the generator for this stream.
    #[must_use]
    pub fn seeded(self, base_seed: u64) -> SmallRng {
        trace!("creating new RNG (seed={}) for {}", base_seed, self.name());
        let seed_offset = hash_str(self.name());
        SmallRng::seed_from_u64(base_seed.wrapping_add(seed_offset))
    }
}
