//! Error types for Struggle Meals core.

use thiserror::Error;

/// Submission errors caught before any network call is issued.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("estimated cost must be a non-negative number, got {0}")]
    InvalidCost(f64),

    #[error("author {0} must not be empty")]
    EmptyAuthor(&'static str),

    #[error("struggle score {0} is outside 0..=100")]
    ScoreOutOfRange(u32),
}
