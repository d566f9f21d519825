pub use crate::buckets::{BucketStore, HostSnapshot};
pub use crate::error::GridSirError;
pub use crate::grid::{Direction, Grid, Position};
pub use crate::hosts::{Host, HostId, InfectionStatus, Population};
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::parameters::Parameters;
pub use crate::random::RngStream;
pub use crate::simulation::Simulation;
pub use crate::summary::{ConsoleReporter, Reporter, Summary, SummaryFormat};
