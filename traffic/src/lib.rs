//! Distributes a traffic-event log across a fixed pool of workers, tallies
//! per-location car counts on each worker and merges the partial tallies
//! into a ranking of the most congested locations.

pub mod config;
pub mod coordinator;
pub mod distributor;
pub mod error;
pub mod group;
pub mod input;
pub mod message;
pub mod record;
pub mod reducer;
pub mod report;
pub mod tally;
pub mod worker;

pub use config::{Config, MalformedPolicy};
pub use coordinator::{Coordinator, Outcome};
pub use error::{Error, Result};
pub use tally::{Ranking, Tally};

/// Position of a participant in the group. The coordinator is rank 0, workers
/// are ranks `1..group_size`.
pub type Rank = usize;

pub const COORDINATOR: Rank = 0;
