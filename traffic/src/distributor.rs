use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    group::WorkerLink,
    message::Assignment,
    Rank,
};

/// Rank of the worker that gets the line at `position` (0-based): strict
/// round-robin starting at worker 1.
pub fn assign(position: usize, workers: usize) -> Rank {
    position % workers + 1
}

/// Sends every line to its round-robin worker, then one end-of-stream marker
/// to each worker in rank order. `workers[r - 1]` must be the link to rank `r`.
///
/// Returns the number of work units sent.
pub async fn distribute<I>(lines: I, workers: &mut [WorkerLink]) -> Result<usize>
where
    I: IntoIterator<Item = String>,
{
    if workers.is_empty() {
        return Err(Error::InsufficientParticipants { group_size: 1 });
    }

    let mut sent = 0;
    for (position, line) in lines.into_iter().enumerate() {
        let rank = assign(position, workers.len());
        workers[rank - 1].send(Assignment::WorkUnit(line)).await?;
        sent += 1;
    }

    for link in workers.iter_mut() {
        link.send(Assignment::EndOfStream).await?;
        debug!(rank = link.peer(), "sent end of stream");
    }

    info!(lines = sent, workers = workers.len(), "distribution finished");
    Ok(sent)
}
