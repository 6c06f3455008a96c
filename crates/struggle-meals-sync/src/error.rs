//! Error types for the sync module.

use thiserror::Error;

use struggle_meals_core::MealId;

/// Errors returned by [`SyncCore`](crate::SyncCore) commands.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The gateway call failed.
    #[error("store error: {0}")]
    Store(#[from] struggle_meals_store::StoreError),

    /// Input rejected before any network call.
    #[error("validation error: {0}")]
    Validation(#[from] struggle_meals_core::ValidationError),

    /// Verification targeted a meal that does not exist.
    #[error("meal not found: {0}")]
    MealNotFound(MealId),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
