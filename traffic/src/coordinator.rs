use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{
    config::Config,
    distributor,
    error::{Error, Result},
    group::{self, Listener, WorkerLink},
    message::Assignment,
    reducer,
    tally::{Ranking, Tally},
    worker::{self, WorkerSummary},
};

/// Result of a complete run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub ranking: Ranking,
    pub tally: Tally,
    pub lines: usize,
    pub reports: usize,
    pub entries: usize,
    pub skipped: u64,
}

/// Supervises the worker pool from rank 0: distributes the input, collects
/// the reports and ranks the merged tally. Every fatal error it observes is
/// broadcast to the workers as an abort.
pub struct Coordinator {
    config: Config,
    workers: Vec<WorkerLink>,
}

impl Coordinator {
    /// Welcomes each worker into the group. `workers[r - 1]` must be the link to
    /// rank `r`.
    pub async fn start(config: Config, workers: Vec<WorkerLink>) -> Result<Self> {
        config.validate()?;
        if workers.len() != config.workers() {
            return Err(Error::InvalidConfig(format!(
                "group of {} needs {} workers, got {}",
                config.group_size,
                config.workers(),
                workers.len()
            )));
        }

        let mut coordinator = Coordinator { config, workers };
        if let Err(e) = coordinator.welcome().await {
            coordinator.abort(&e.to_string()).await;
            return Err(e);
        }
        Ok(coordinator)
    }

    async fn welcome(&mut self) -> Result<()> {
        let group_size = self.config.group_size;
        let on_malformed = self.config.on_malformed;
        for link in self.workers.iter_mut() {
            link.send(Assignment::Welcome {
                rank: link.peer(),
                group_size,
                on_malformed,
            })
            .await?;
        }
        info!(group_size, ?on_malformed, "group formed");
        Ok(())
    }

    pub async fn run(mut self, lines: Vec<String>) -> Result<Outcome> {
        match self.execute(lines).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.abort(&e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn execute(&mut self, lines: Vec<String>) -> Result<Outcome> {
        let lines = distributor::distribute(lines, &mut self.workers).await?;
        let reduction = reducer::collect(&mut self.workers).await?;
        let ranking = reduction.tally.ranking(self.config.top_k);
        if reduction.skipped > 0 {
            warn!(skipped = reduction.skipped, "malformed records were skipped");
        }
        Ok(Outcome {
            ranking,
            tally: reduction.tally,
            lines,
            reports: reduction.reports,
            entries: reduction.entries,
            skipped: reduction.skipped,
        })
    }

    /// Tells every worker to stop. Delivery is best effort: a worker that
    /// already exited has nothing left to stop.
    pub async fn abort(&mut self, reason: &str) {
        error!(reason, "aborting group");
        for link in self.workers.iter_mut() {
            let _ = link
                .send(Assignment::Abort {
                    reason: reason.to_string(),
                })
                .await;
        }
    }
}

/// Forms the group, loads the input with `load` and runs to completion,
/// aborting the whole group when loading fails.
async fn run_group<F>(config: Config, workers: Vec<WorkerLink>, load: F) -> Result<Outcome>
where
    F: FnOnce() -> Result<Vec<String>>,
{
    let mut coordinator = Coordinator::start(config, workers).await?;
    let lines = match load() {
        Ok(lines) => lines,
        Err(e) => {
            coordinator.abort(&e.to_string()).await;
            return Err(e);
        }
    };
    coordinator.run(lines).await
}

/// Runs with an in-process pool of `config.workers()` worker tasks.
pub async fn run_local<F>(config: Config, load: F) -> Result<Outcome>
where
    F: FnOnce() -> Result<Vec<String>>,
{
    config.validate()?;
    let (links, worker_links) = group::local(config.workers());
    let handles: Vec<JoinHandle<Result<WorkerSummary>>> = worker_links
        .into_iter()
        .map(|link| tokio::spawn(worker::run(link)))
        .collect();

    let result = run_group(config, links, load).await;
    let mut root_cause = None;
    for handle in handles {
        match handle.await? {
            Ok(_)
            | Err(
                Error::Aborted { .. } | Error::Disconnected { .. } | Error::Transport { .. },
            ) => {}
            Err(e) => {
                root_cause.get_or_insert(e);
            }
        }
    }
    // a worker's own error explains the run better than the coordinator's
    // view of that worker going away
    match root_cause {
        Some(e) => Err(e),
        None => result,
    }
}

/// Runs with `config.workers()` worker processes that connect to `listener`.
pub async fn run_tcp<F>(config: Config, listener: Listener, load: F) -> Result<Outcome>
where
    F: FnOnce() -> Result<Vec<String>>,
{
    config.validate()?;
    let links = listener.accept_workers(config.workers()).await?;
    run_group(config, links, load).await
}
