use std::fmt::Display;

use thiserror::Error;

/// Every failure the tracking core can report. Each variant is returned once,
/// immediately classified; nothing here is retried internally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackerError {
    /// Caller-supplied weight was zero, negative or not a finite number.
    #[error("invalid weight value {0}: must be a finite number greater than 0")]
    InvalidValue(f64),
    /// The durable medium could not be read or written, or holds corrupt records.
    #[error("measurement store unavailable: {0}")]
    StoreUnavailable(String),
    /// Statistics were requested against an empty series.
    #[error("no measurements recorded yet")]
    NoData,
}

impl TrackerError {
    pub(crate) fn unavailable(what: impl Display, cause: impl Display) -> Self {
        TrackerError::StoreUnavailable(format!("{what}: {cause}"))
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
