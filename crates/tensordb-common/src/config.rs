//! Store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{TensorDbError, TensorDbResult};

/// Configuration for a TensorDB store.
///
/// # Example
///
/// ```rust
/// use tensordb_common::StoreConfig;
///
/// let config = StoreConfig::with_data_dir("/var/lib/tensordb");
/// assert!(config.sync_on_save);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the `.meta` and `.data` files.
    pub data_dir: PathBuf,

    /// Flush mmap-backed writes to disk at the end of every save.
    /// Default: true.
    pub sync_on_save: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./tensordb-data"),
            sync_on_save: true,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration rooted at the given directory.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Creates a configuration for tests: no durability guarantees.
    #[must_use]
    pub fn for_testing(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            sync_on_save: false,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> TensorDbResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(TensorDbError::InvalidConfig {
                message: "data_dir must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
