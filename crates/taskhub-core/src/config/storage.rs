//! Upload storage configuration.

use serde::{Deserialize, Serialize};

/// Local upload storage configuration.
///
/// Per-category upload constraints (avatar, chat attachment, task
/// attachment) are fixed policy, not configuration; they live in
/// `taskhub-storage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
        }
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}
