//! Error taxonomy for the Ledger Engine.
//!
//! Only one condition ever propagates to a caller as a failure:
//! [`EngineError::InvalidInput`].  Every other anomaly (an inventory
//! lookup miss, an unreadable date on a record, a zero denominator)
//! is absorbed into the computation with a deterministic zero/skip
//! policy so that reporting stays available even with dirty data.

use thiserror::Error;

/// Errors returned by the calculation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required argument was missing or malformed, e.g. a pay month
    /// that is not `YYYY-MM` or a report anchor that cannot be parsed.
    /// Fails fast with no partial result.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
