//! Messages exchanged inside the participant group.
//!
//! Work assignment and result reporting travel in opposite directions and
//! use different types, so a report can never be read as work or as an
//! end-of-stream marker.
//!
//! ```text
//! Coordinator                      Worker
//!     |-------- Welcome ------------->|
//!     |-------- WorkUnit * n -------->|
//!     |-------- EndOfStream --------->|
//!     |<------- Size -----------------|
//!     |<------- Entry * size ---------|
//! ```

use serde::{Deserialize, Serialize};

use crate::{config::MalformedPolicy, Rank};

/// Upper bound of one encoded message on a socket link. A work unit carries
/// at most one record line.
pub const MAX_FRAME_LEN: usize = 4 * 1024;

/// Coordinator to worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assignment {
    /// Join handshake: tells the worker its rank and the group-wide policy.
    Welcome {
        rank: Rank,
        group_size: usize,
        on_malformed: MalformedPolicy,
    },
    WorkUnit(String),
    EndOfStream,
    Abort { reason: String },
}

/// Worker to coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Report {
    /// Number of `Entry` messages that follow.
    Size { entries: usize, skipped: u64 },
    Entry { location: String, count: u64 },
    Failed { reason: String },
}

impl Assignment {
    pub fn kind(&self) -> &'static str {
        match self {
            Assignment::Welcome { .. } => "welcome",
            Assignment::WorkUnit(_) => "work unit",
            Assignment::EndOfStream => "end of stream",
            Assignment::Abort { .. } => "abort",
        }
    }
}

impl Report {
    pub fn kind(&self) -> &'static str {
        match self {
            Report::Size { .. } => "report size",
            Report::Entry { .. } => "report entry",
            Report::Failed { .. } => "failure",
        }
    }
}
