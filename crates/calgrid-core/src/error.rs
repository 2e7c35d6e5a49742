//! Core error types.
//!
//! All core failures are local, synchronous validation errors reported to
//! the immediate caller; the engine has no I/O and no retryable surface.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the scheduling engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A query range with `from` after `to`.
    #[error("invalid date range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    /// A month outside `1..=12` (or a year outside the calendar range).
    #[error("invalid month: {month} (expected 1-12)")]
    InvalidMonth { month: u32 },

    /// An event violating its construction invariants.
    #[error("invalid event {id:?}: {reason}")]
    InvalidEvent { id: String, reason: String },
}

impl CoreError {
    /// Creates an invalid event error.
    pub fn invalid_event(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEvent {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
