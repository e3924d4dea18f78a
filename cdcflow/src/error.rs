//! Errors.

use thiserror::Error;

use crate::clock::Domain;

#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid sync mode encoding: {0:#04b}")]
    InvalidSyncModeBits(u8),

    #[error("unknown sync mode: {0:?} (expected async, meso or iso)")]
    UnknownSyncMode(String),

    #[error("clock period must be nonzero")]
    ZeroPeriod,
}

#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("condition not reached within {steps} steps")]
    Timeout { steps: u64 },

    #[error("{0} domain panicked")]
    DomainPanicked(Domain),
}
