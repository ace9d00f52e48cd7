use std::num::ParseIntError;

use thiserror::Error;

/// Upper bound on a record line in bytes, counting the line terminator.
pub const MAX_RECORD_LEN: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is {len} bytes, limit is {max}", max = MAX_RECORD_LEN - 1)]
    TooLong { len: usize },

    #[error("missing {0} field")]
    MissingField(&'static str),

    #[error("empty location")]
    EmptyLocation,

    #[error("count {value:?} is not a plain decimal number")]
    NotDigits { value: String },

    #[error("invalid count {value:?}")]
    InvalidCount {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// One `timestamp,location,count` line. The timestamp is checked for presence
/// and then dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub location: &'a str,
    pub count: u64,
}

impl<'a> Record<'a> {
    pub fn parse(line: &'a str) -> Result<Self, RecordError> {
        check_len(line)?;

        // fields past the third are ignored
        let mut fields = line.splitn(4, ',').map(str::trim);
        fields
            .next()
            .filter(|ts| !ts.is_empty())
            .ok_or(RecordError::MissingField("timestamp"))?;
        let location = fields.next().ok_or(RecordError::MissingField("location"))?;
        let count = fields.next().ok_or(RecordError::MissingField("count"))?;

        if location.is_empty() {
            return Err(RecordError::EmptyLocation);
        }
        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RecordError::NotDigits {
                value: count.to_string(),
            });
        }
        let count = count
            .parse::<u64>()
            .map_err(|source| RecordError::InvalidCount {
                value: count.to_string(),
                source,
            })?;

        Ok(Record { location, count })
    }
}

pub fn check_len(line: &str) -> Result<(), RecordError> {
    if line.len() + 1 > MAX_RECORD_LEN {
        return Err(RecordError::TooLong { len: line.len() });
    }
    Ok(())
}
