//! JSON-file roster gateway.
//!
//! # Responsibility
//! - Load the roster file through the codec with fallback-friendly outcomes.
//! - Save frozen snapshots atomically.
//!
//! # Invariants
//! - Raw parse/validation detail is carried only as the error source.
//! - Emits `roster_load`/`roster_save` events with duration and status.

use super::codec::{decode, encode, RosterDocument};
use super::json_file::{read_json_file, write_json_file};
use super::{RosterRepository, StorageError, StorageResult};
use crate::store::record_store::{RecordStore, RosterSnapshot};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Roster gateway backed by one JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonRosterStorage {
    path: PathBuf,
}

impl JsonRosterStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RosterRepository for JsonRosterStorage {
    fn roster_path(&self) -> &Path {
        &self.path
    }

    fn load_roster(&self) -> StorageResult<Option<RecordStore>> {
        let started_at = Instant::now();
        info!("event=roster_load module=storage status=start");

        let document = match read_json_file::<RosterDocument>(&self.path) {
            Ok(Some(document)) => document,
            Ok(None) => {
                info!(
                    "event=roster_load module=storage status=missing duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return Ok(None);
            }
            Err(err) => {
                warn!(
                    "event=roster_load module=storage status=error duration_ms={} error_code=roster_unreadable {}",
                    started_at.elapsed().as_millis(),
                    err.log_fields()
                );
                return Err(StorageError::loading(&self.path, err));
            }
        };

        match decode(&document) {
            Ok(store) => {
                info!(
                    "event=roster_load module=storage status=ok duration_ms={} students={}",
                    started_at.elapsed().as_millis(),
                    store.len()
                );
                Ok(Some(store))
            }
            Err(err) => {
                warn!(
                    "event=roster_load module=storage status=error duration_ms={} error_code=roster_malformed field={}",
                    started_at.elapsed().as_millis(),
                    err.field
                );
                Err(StorageError::loading(&self.path, err))
            }
        }
    }

    fn save_roster(&self, snapshot: &RosterSnapshot) -> StorageResult<()> {
        let started_at = Instant::now();
        let document = encode(snapshot.iter());

        match write_json_file(&self.path, &document) {
            Ok(()) => {
                info!(
                    "event=roster_save module=storage status=ok duration_ms={} students={}",
                    started_at.elapsed().as_millis(),
                    snapshot.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=roster_save module=storage status=error duration_ms={} error_code=roster_write_failed {}",
                    started_at.elapsed().as_millis(),
                    err.log_fields()
                );
                Err(StorageError::saving(&self.path, err))
            }
        }
    }
}
