//! Error taxonomy for a counting run.
//!
//! A lost update under [`Protection::Unprotected`](crate::Protection) is not
//! an error: it is reported through [`RunReport`](crate::RunReport).

use std::io;

/// Errors that stop a run before any increment happens.
#[derive(Debug, thiserror::Error)]
pub enum RaceError {
    #[error("thread count must be at least 1, got {0}")]
    InvalidThreads(i64),
    #[error("loops per thread must not be negative, got {0}")]
    InvalidLoops(i64),
    #[error("failed to spawn worker {id}: {source}")]
    Spawn {
        id: usize,
        #[source]
        source: io::Error,
    },
    #[error("failed to read process clock: {0}")]
    Clock(#[source] io::Error),
}

impl RaceError {
    /// True for errors caused by the caller's configuration rather than the
    /// host.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::InvalidThreads(_) | Self::InvalidLoops(_))
    }
}

pub type Result<T> = std::result::Result<T, RaceError>;
