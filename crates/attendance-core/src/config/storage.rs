//! Durable client storage configuration.

use serde::{Deserialize, Serialize};

/// Where the client keeps its persisted records (the session).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one `<key>.json` file per record.
    #[serde(default = "default_directory")]
    pub directory: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

fn default_directory() -> String {
    ".attendance".to_string()
}
