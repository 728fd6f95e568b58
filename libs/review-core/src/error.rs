//! Error types for review-core.

use thiserror::Error;

/// Result type alias using SchedulerError.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors raised while scheduling a review.
///
/// None of these are transient: each one points at a caller bug or corrupted
/// persisted data, so there is nothing to retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    #[error("invalid rating: {0}")]
    InvalidRating(String),

    #[error("invalid card state: {0}")]
    InvalidState(String),

    #[error("invalid scheduling policy: {0}")]
    InvalidPolicy(String),

    #[error("due date out of range for interval of {interval} days")]
    DueDateOutOfRange { interval: f64 },
}
