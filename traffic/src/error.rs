use std::{io, net::SocketAddr, path::PathBuf};

use thiserror::Error;

use crate::{record::RecordError, Rank};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("requires at least 2 participants, got {group_size}")]
    InsufficientParticipants { group_size: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to open {}", path.display())]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read input at line {line}")]
    InputRead {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("input line {line} is {len} bytes, longer than the record limit")]
    RecordTooLong { line: usize, len: usize },

    #[error("worker {rank} got malformed record {record:?}")]
    MalformedRecord {
        rank: Rank,
        record: String,
        #[source]
        source: RecordError,
    },

    #[error("car count for {location:?} does not fit in 64 bits")]
    CountOverflow { location: String },

    #[error("protocol violation from rank {peer}: unexpected {message} while {state}")]
    ProtocolViolation {
        peer: Rank,
        state: &'static str,
        message: &'static str,
    },

    #[error("worker {rank} failed: {reason}")]
    WorkerFailed { rank: Rank, reason: String },

    #[error("run aborted by coordinator: {reason}")]
    Aborted { reason: String },

    #[error("failed to listen on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("listener on {addr} stopped before all workers joined")]
    ListenerClosed { addr: SocketAddr },

    #[error("failed to connect to coordinator at {addr}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("transport error on link to rank {peer}")]
    Transport {
        peer: Rank,
        #[source]
        source: io::Error,
    },

    #[error("link to rank {peer} closed")]
    Disconnected { peer: Rank },

    #[error("worker task did not finish")]
    Join(#[from] tokio::task::JoinError),
}
