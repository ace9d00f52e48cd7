use tracing::{debug, info, warn};

use crate::{
    config::MalformedPolicy,
    error::{Error, Result},
    group::CoordinatorLink,
    message::{Assignment, Report},
    record::Record,
    tally::Tally,
    Rank, COORDINATOR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the coordinator's welcome.
    Joining,
    Receiving,
    Reporting,
}

impl Phase {
    fn describe(self) -> &'static str {
        match self {
            Phase::Joining => "joining",
            Phase::Receiving => "receiving work",
            Phase::Reporting => "reporting",
        }
    }
}

/// What the receive loop does after a message was accepted.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Report,
}

/// Per-worker state machine: tallies the work units it is handed until the
/// end-of-stream marker, then turns the local tally into a report.
#[derive(Debug)]
pub struct Aggregator {
    rank: Rank,
    phase: Phase,
    policy: MalformedPolicy,
    tally: Tally,
    skipped: u64,
}

impl Default for Aggregator {
    fn default() -> Self {
        Aggregator {
            rank: COORDINATOR,
            phase: Phase::Joining,
            policy: MalformedPolicy::default(),
            tally: Tally::new(),
            skipped: 0,
        }
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn accept(&mut self, msg: Assignment) -> Result<Flow> {
        match (self.phase, msg) {
            (_, Assignment::Abort { reason }) => Err(Error::Aborted { reason }),
            (
                Phase::Joining,
                Assignment::Welcome {
                    rank,
                    group_size,
                    on_malformed,
                },
            ) => {
                self.rank = rank;
                self.policy = on_malformed;
                self.phase = Phase::Receiving;
                debug!(rank, group_size, ?on_malformed, "joined group");
                Ok(Flow::Continue)
            }
            (Phase::Receiving, Assignment::WorkUnit(line)) => {
                self.tally_line(&line)?;
                Ok(Flow::Continue)
            }
            (Phase::Receiving, Assignment::EndOfStream) => {
                self.phase = Phase::Reporting;
                Ok(Flow::Report)
            }
            (phase, msg) => Err(Error::ProtocolViolation {
                peer: COORDINATOR,
                state: phase.describe(),
                message: msg.kind(),
            }),
        }
    }

    fn tally_line(&mut self, line: &str) -> Result<()> {
        match Record::parse(line) {
            Ok(record) => self.tally.add(record.location, record.count),
            Err(source) => match self.policy {
                MalformedPolicy::Abort => Err(Error::MalformedRecord {
                    rank: self.rank,
                    record: line.to_string(),
                    source,
                }),
                MalformedPolicy::Skip => {
                    warn!(rank = self.rank, record = line, error = %source, "skipping malformed record");
                    self.skipped += 1;
                    Ok(())
                }
            },
        }
    }

    /// The size message followed by one entry per location. Only valid once
    /// the end-of-stream marker was accepted.
    pub fn into_reports(self) -> Result<impl Iterator<Item = Report>> {
        if self.phase != Phase::Reporting {
            return Err(Error::ProtocolViolation {
                peer: self.rank,
                state: self.phase.describe(),
                message: "report request",
            });
        }
        let size = Report::Size {
            entries: self.tally.len(),
            skipped: self.skipped,
        };
        let entries = self
            .tally
            .into_iter()
            .map(|(location, count)| Report::Entry { location, count });
        Ok(std::iter::once(size).chain(entries))
    }
}

/// What a worker did during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSummary {
    pub rank: Rank,
    pub records: u64,
    pub locations: usize,
    pub skipped: u64,
}

/// Runs one worker to completion over `link`: join, receive until end of
/// stream, report the local tally. A fatal error is reported back as
/// `Report::Failed` before it is returned, unless the coordinator itself
/// aborted the run.
pub async fn run(mut link: CoordinatorLink) -> Result<WorkerSummary> {
    let mut aggregator = Aggregator::new();
    let mut records = 0u64;

    loop {
        let msg = link.recv().await?;
        let is_work = matches!(msg, Assignment::WorkUnit(_));
        match aggregator.accept(msg) {
            Ok(Flow::Continue) => records += is_work as u64,
            Ok(Flow::Report) => break,
            Err(e) => {
                if !matches!(e, Error::Aborted { .. }) {
                    let _ = link
                        .send(Report::Failed {
                            reason: e.to_string(),
                        })
                        .await;
                }
                warn!(rank = aggregator.rank(), error = %e, "worker stopped");
                return Err(e);
            }
        }
    }

    let summary = WorkerSummary {
        rank: aggregator.rank(),
        records,
        locations: aggregator.tally().len(),
        skipped: aggregator.skipped(),
    };
    for report in aggregator.into_reports()? {
        link.send(report).await?;
    }
    info!(
        rank = summary.rank,
        records = summary.records,
        locations = summary.locations,
        "worker reported"
    );
    Ok(summary)
}
