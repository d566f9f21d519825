use std::fmt::{self, Display};

use crate::error::GridSirError;
use crate::grid::Grid;

pub const MAX_BOUND: i64 = 1000;
pub const MAX_POPULATION: i64 = 100_000;
pub const MAX_SLOTS: i64 = 100_000;
pub const DEFAULT_SEED: u64 = 12345;

/// Simulation-wide constants, fixed for the whole run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Parameters {
    /// Coordinate bound `k`: positions range over `[-k, k]`.
    pub bound: i32,
    /// Population size `m`.
    pub population: usize,
    /// Rounds `T` a host stays infected.
    pub infectious_period: u32,
    /// Number of buckets `N` in the spatial hash.
    pub slots: usize,
    pub seed: u64,
}

impl Parameters {
    /// Validates `k m T N` and builds parameters with the default seed.
    ///
    /// # Errors
    /// Returns `GridSirError::ParameterOutOfRange` for the first value outside its range:
    /// `k` in `0..=1000`, `m` in `1..=100000`, `T` in `1..=u32::MAX`, `N` in `1..=100000`.
    pub fn new(k: i64, m: i64, t: i64, n: i64) -> Result<Self, GridSirError> {
        let bound = check_range("k", k, 0, MAX_BOUND)?;
        let population = check_range("m", m, 1, MAX_POPULATION)?;
        let infectious_period = check_range("T", t, 1, i64::from(u32::MAX))?;
        let slots = check_range("N", n, 1, MAX_SLOTS)?;
        Ok(Parameters {
            bound,
            population,
            infectious_period,
            slots,
            seed: DEFAULT_SEED,
        })
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn grid(&self) -> Grid {
        Grid::new(self.bound)
    }
}

fn check_range<T: TryFrom<i64>>(
    name: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<T, GridSirError> {
    if (min..=max).contains(&value) {
        if let Ok(value) = T::try_from(value) {
            return Ok(value);
        }
    }
    Err(GridSirError::out_of_range(name, value, min, max))
}

impl Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "k={} m={} T={} N={} seed={}",
            self.bound, self.population, self.infectious_period, self.slots, self.seed
        )
    }
}
