//! Synchronization settings.

use serde::{Deserialize, Serialize};

/// Configuration for a [`SyncCore`](crate::SyncCore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Refetch a stale entry when it is read instead of serving it as-is.
    pub refetch_stale_on_read: bool,
    /// Limit used by `latest_remixes(None)`.
    pub default_latest_remixes_limit: usize,
    /// Limit used by `recent_meals(None)`.
    pub default_recent_meals_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refetch_stale_on_read: true,
            default_latest_remixes_limit: 6,
            default_recent_meals_limit: 4,
        }
    }
}
