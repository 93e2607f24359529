//! Client configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! `config/default.toml`, an optional environment overlay, and environment
//! variables prefixed with `ATTENDANCE`. Every field has a default so the
//! client still starts when no file is present.

pub mod api;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

use self::api::ApiConfig;
use self::logging::LoggingConfig;
use self::storage::StorageConfig;

use crate::error::AppError;

/// Root client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Attendance service endpoint settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Durable client storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// Load configuration for the given environment.
    ///
    /// Merges `config/default`, `config/{env}` and `ATTENDANCE__*` variables,
    /// later sources overriding earlier ones.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration starting from an explicit base file (extension optional).
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let overlay = std::path::Path::new(base)
            .with_file_name(env)
            .to_string_lossy()
            .into_owned();

        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&overlay).required(false))
            .add_source(
                config::Environment::with_prefix("ATTENDANCE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("default");
        let config = ClientConfig::load_from(base.to_str().unwrap(), "nowhere").unwrap();
        assert_eq!(config.api.timeout_seconds, 15);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.storage.directory, ".attendance");
    }

    #[test]
    fn test_overlay_overrides_base() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[api]\nbase_url = \"http://school.local/api/v1\"\ntimeout_seconds = 5\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("staging.toml"),
            "[api]\nbase_url = \"https://staging.school/api/v1\"\n",
        )
        .unwrap();

        let base = dir.path().join("default");
        let config = ClientConfig::load_from(base.to_str().unwrap(), "staging").unwrap();
        assert_eq!(config.api.base_url, "https://staging.school/api/v1");
        assert_eq!(config.api.timeout_seconds, 5);
    }
}
