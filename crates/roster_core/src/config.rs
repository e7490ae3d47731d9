//! Application configuration file.
//!
//! # Responsibility
//! - Describe process-level settings read before anything else starts.
//! - Load/save the config document with the same fallback policy as prefs.
//!
//! # Invariants
//! - A loaded config is always usable: every field has a default.
//! - Configuration is passed explicitly; core keeps no global config state.

use crate::logging::default_log_level;
use crate::storage::json_file::{read_json_file, write_json_file};
use crate::storage::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
const DEFAULT_USER_PREFS_FILE: &str = "preferences.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<PathBuf>,
    pub user_prefs_file_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            user_prefs_file_path: PathBuf::from(DEFAULT_USER_PREFS_FILE),
        }
    }
}

/// Reads the config at `path`; `Ok(None)` when the file does not exist.
pub fn read_config(path: &Path) -> StorageResult<Option<Config>> {
    read_json_file(path).map_err(|err| StorageError::loading(path, err))
}

pub fn save_config(config: &Config, path: &Path) -> StorageResult<()> {
    write_json_file(path, config).map_err(|err| StorageError::saving(path, err))
}
