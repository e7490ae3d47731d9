//! JSON-file preferences gateway.

use super::json_file::{read_json_file, write_json_file};
use super::{PrefsRepository, StorageError, StorageResult};
use crate::model::prefs::UserPrefs;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonPrefsStorage {
    path: PathBuf,
}

impl JsonPrefsStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PrefsRepository for JsonPrefsStorage {
    fn prefs_path(&self) -> &Path {
        &self.path
    }

    fn load_prefs(&self) -> StorageResult<Option<UserPrefs>> {
        match read_json_file::<UserPrefs>(&self.path) {
            Ok(prefs) => {
                info!(
                    "event=prefs_load module=storage status={}",
                    if prefs.is_some() { "ok" } else { "missing" }
                );
                Ok(prefs)
            }
            Err(err) => {
                warn!(
                    "event=prefs_load module=storage status=error {}",
                    err.log_fields()
                );
                Err(StorageError::loading(&self.path, err))
            }
        }
    }

    fn save_prefs(&self, prefs: &UserPrefs) -> StorageResult<()> {
        write_json_file(&self.path, prefs).map_err(|err| {
            error!(
                "event=prefs_save module=storage status=error {}",
                err.log_fields()
            );
            StorageError::saving(&self.path, err)
        })
    }
}
