//! Engine configuration
//!
//! Two flags control a scan:
//! - `recover_deleted`: forwarded to the hive decoder untouched
//! - `skip_log_replay`: scan a dirty store without replaying its logs
//!
//! Both default to `false`. Options can be built in code or loaded from a
//! JSON file:
//!
//! ```json
//! { "recover_deleted": true, "skip_log_replay": false }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration load failures
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON
    #[error("invalid config JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Options for one engine run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Ask the hive decoder to recover deleted keys and values
    #[serde(default)]
    pub recover_deleted: bool,

    /// Do not replay transaction logs into a dirty store
    #[serde(default)]
    pub skip_log_replay: bool,
}

impl EngineOptions {
    /// Load options from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_recover_deleted(mut self, recover_deleted: bool) -> Self {
        self.recover_deleted = recover_deleted;
        self
    }

    pub fn with_skip_log_replay(mut self, skip_log_replay: bool) -> Self {
        self.skip_log_replay = skip_log_replay;
        self
    }
}
