//! A spatial-hash SIR simulation of mobile hosts on a toroidal grid.
//!
//! `M` hosts walk randomly on a `(2k+1) x (2k+1)` grid that wraps at its edges. Every host is
//! Susceptible, Infected or Recovered. A susceptible host becomes infected when it stands on a
//! cell where an infected host ended the previous round, and an infected host recovers after `T`
//! rounds. The simulation runs until no infected host remains.
//!
//! Co-located hosts are found through a flat spatial hash rather than a pairwise scan:
//! * [`hashing`] maps each cell to a dense key and scrambles it into one of `N` buckets.
//! * [`buckets`] holds snapshots of the infected hosts in each bucket and answers exact
//!   position queries.
//! * [`simulation`] owns the population and the bucket store and executes rounds.
//!
//! A run is reproducible: given the same seed and parameters, the sequence of per-round
//! [`Summary`](summary::Summary) values is identical.
//!
//! ```rust
//! use ixa_gridsir::prelude::*;
//!
//! let parameters = Parameters::new(1, 5, 2, 3).unwrap().with_seed(42);
//! let mut summaries: Vec<Summary> = Vec::new();
//! let last = Simulation::new(parameters).run(&mut summaries).unwrap();
//! assert_eq!(last.infected, 0);
//! assert_eq!(last.population(), 5);
//! ```
pub mod buckets;
pub mod error;
pub mod execution_stats;
pub mod grid;
pub mod hashing;
pub mod hosts;
pub mod log;
pub mod parameters;
pub mod prelude;
pub mod random;
pub mod runner;
pub mod simulation;
pub mod summary;

pub use error::GridSirError;
