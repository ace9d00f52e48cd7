use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    group::WorkerLink,
    message::Report,
    tally::Tally,
    Rank,
};

/// Everything the coordinator collected from the workers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reduction {
    pub tally: Tally,
    /// Size-prefixed reports received, one per worker.
    pub reports: usize,
    /// Entries across all reports; a location seen by several workers counts
    /// once per worker.
    pub entries: usize,
    /// Malformed records the workers dropped.
    pub skipped: u64,
}

/// Collects one report from each worker, in rank order, folding every entry
/// into the global tally. A worker's report is consumed completely before the
/// next worker is read.
pub async fn collect(workers: &mut [WorkerLink]) -> Result<Reduction> {
    let mut reduction = Reduction::default();

    for link in workers.iter_mut() {
        let rank = link.peer();
        let (entries, skipped) = match link.recv().await? {
            Report::Size { entries, skipped } => (entries, skipped),
            other => return Err(unexpected(rank, "awaiting report size", other)),
        };

        for _ in 0..entries {
            match link.recv().await? {
                Report::Entry { location, count } => reduction.tally.add(&location, count)?,
                other => return Err(unexpected(rank, "awaiting report entry", other)),
            }
        }

        debug!(rank, entries, skipped, "collected report");
        reduction.reports += 1;
        reduction.entries += entries;
        reduction.skipped += skipped;
    }

    info!(
        reports = reduction.reports,
        locations = reduction.tally.len(),
        "reduction finished"
    );
    Ok(reduction)
}

fn unexpected(rank: Rank, state: &'static str, report: Report) -> Error {
    match report {
        Report::Failed { reason } => Error::WorkerFailed { rank, reason },
        other => Error::ProtocolViolation {
            peer: rank,
            state,
            message: other.kind(),
        },
    }
}
