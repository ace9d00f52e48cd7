use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What a worker does with a line it cannot parse.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum MalformedPolicy {
    /// Fail the worker and abort the whole group.
    #[default]
    Abort,
    /// Log a warning, drop the line and count it as skipped.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Participants including the coordinator.
    pub group_size: usize,
    /// Length bound of the ranking.
    pub top_k: usize,
    pub on_malformed: MalformedPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            group_size: 4,
            top_k: 3,
            on_malformed: MalformedPolicy::Abort,
        }
    }
}

impl Config {
    pub fn new(group_size: usize) -> Self {
        Config {
            group_size,
            ..Default::default()
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_policy(mut self, on_malformed: MalformedPolicy) -> Self {
        self.on_malformed = on_malformed;
        self
    }

    pub fn workers(&self) -> usize {
        self.group_size.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.group_size < 2 {
            return Err(Error::InsufficientParticipants {
                group_size: self.group_size,
            });
        }
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top must be at least 1".to_string()));
        }
        Ok(())
    }
}
