//! Durable storage for roster data and user preferences.
//!
//! # Responsibility
//! - Define gateway contracts used by startup and session code.
//! - Keep file format and file I/O details behind those contracts.
//!
//! # Invariants
//! - A missing file is a distinct outcome (`Ok(None)`), not an error.
//! - Load paths never write; a corrupt file stays byte-identical on disk.
//! - Save failures surface as `StorageError::Io` and never touch memory state.

use crate::model::prefs::UserPrefs;
use crate::storage::codec::MalformedDataError;
use crate::store::record_store::{RecordStore, RosterSnapshot};
use json_file::JsonFileError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub mod codec;
pub mod json_file;
pub mod prefs_storage;
pub mod roster_storage;

pub use prefs_storage::JsonPrefsStorage;
pub use roster_storage::JsonRosterStorage;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    /// File exists but cannot be turned into valid data.
    DataLoading {
        path: PathBuf,
        source: Box<dyn Error + Send + Sync + 'static>,
    },
    /// File could not be written.
    Io { path: PathBuf, source: io::Error },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataLoading { path, source } => {
                write!(f, "could not load data from `{}`: {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "could not save data to `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DataLoading { source, .. } => Some(source.as_ref()),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl StorageError {
    /// Wraps a read-side failure; every load failure is a data-loading error.
    pub(crate) fn loading(path: &Path, source: impl Error + Send + Sync + 'static) -> Self {
        Self::DataLoading {
            path: path.to_path_buf(),
            source: Box::new(source),
        }
    }

    /// Metadata-only `key=value` fields for log lines.
    ///
    /// Unlike `Display`, this never includes field values or file contents:
    /// malformed documents report the offending field path only.
    pub fn log_fields(&self) -> String {
        match self {
            Self::DataLoading { source, .. } => {
                if let Some(malformed) = source.downcast_ref::<MalformedDataError>() {
                    format!("error_kind=malformed field={}", malformed.field)
                } else if let Some(file_err) = source.downcast_ref::<JsonFileError>() {
                    file_err.log_fields()
                } else {
                    "error_kind=data_loading".to_string()
                }
            }
            Self::Io { source, .. } => format!("error_kind=io io_kind={:?}", source.kind()),
        }
    }

    /// Converts a write-side failure into `Io`.
    pub(crate) fn saving(path: &Path, err: JsonFileError) -> Self {
        match err {
            JsonFileError::Io { path, source } => Self::Io { path, source },
            JsonFileError::Json { source, .. } => Self::Io {
                path: path.to_path_buf(),
                source: io::Error::other(source),
            },
        }
    }
}

/// Gateway for the roster data file.
pub trait RosterRepository {
    fn roster_path(&self) -> &Path;
    /// Returns `Ok(None)` when no roster file exists yet.
    fn load_roster(&self) -> StorageResult<Option<RecordStore>>;
    fn save_roster(&self, snapshot: &RosterSnapshot) -> StorageResult<()>;
}

/// Gateway for the user preferences file.
pub trait PrefsRepository {
    fn prefs_path(&self) -> &Path;
    /// Returns `Ok(None)` when no preferences file exists yet.
    fn load_prefs(&self) -> StorageResult<Option<UserPrefs>>;
    fn save_prefs(&self, prefs: &UserPrefs) -> StorageResult<()>;
}
