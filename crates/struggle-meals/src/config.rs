//! Client configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use struggle_meals_store::GatewayConfig;
use struggle_meals_sync::SyncConfig;

use crate::error::Result;

/// Configuration for a [`Client`](crate::Client).
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```json
/// { "database_path": "meals.db", "sync": { "refetch_stale_on_read": false } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Row mapping defaults.
    pub gateway: GatewayConfig,
    /// Cache behaviour.
    pub sync: SyncConfig,
    /// SQLite file for [`Client::open`](crate::Client::open); in-memory
    /// SQLite when unset.
    pub database_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = ClientConfig::from_json_str(
            r#"{ "sync": { "default_latest_remixes_limit": 3 } }"#,
        )
        .unwrap();

        assert_eq!(config.sync.default_latest_remixes_limit, 3);
        assert_eq!(config.sync.default_recent_meals_limit, 4);
        assert!(config.sync.refetch_stale_on_read);
        assert_eq!(config.gateway, GatewayConfig::default());
        assert_eq!(config.database_path, None);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "database_path": "meals.db", "gateway": {{ "unknown_handle": "anon" }} }}"#
        )
        .unwrap();

        let config = ClientConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.database_path, Some(PathBuf::from("meals.db")));
        assert_eq!(config.gateway.unknown_handle, "anon");
        assert_eq!(config.gateway.unknown_meal_author, "unknown_chef");
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = ClientConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, crate::ClientError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ClientConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, crate::ClientError::Io(_)));
    }
}
