//! JSON file read/write helpers shared by every storage gateway.
//!
//! # Invariants
//! - A missing file is reported as `Ok(None)`, never as an error.
//! - Writes go through a sibling temp file and a rename, so a failed write
//!   leaves the previous file contents intact.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug)]
pub enum JsonFileError {
    /// OS-level failure reading or writing `path`.
    Io { path: PathBuf, source: io::Error },
    /// Contents are not valid JSON for the expected shape.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for JsonFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error at `{}`: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "invalid JSON in `{}`: {source}", path.display())
            }
        }
    }
}

impl JsonFileError {
    /// Metadata-only `key=value` fields for log lines.
    ///
    /// Parser messages can quote file contents, so only the error category
    /// and position are reported.
    pub fn log_fields(&self) -> String {
        match self {
            Self::Io { source, .. } => format!("error_kind=io io_kind={:?}", source.kind()),
            Self::Json { source, .. } => format!(
                "error_kind=json category={:?} line={} column={}",
                source.classify(),
                source.line(),
                source.column()
            ),
        }
    }
}

impl Error for JsonFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

/// Reads and deserializes `path`; `Ok(None)` when the file does not exist.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, JsonFileError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(JsonFileError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| JsonFileError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Serializes `value` as pretty JSON and atomically replaces `path`.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), JsonFileError> {
    let mut contents = serde_json::to_vec_pretty(value).map_err(|source| JsonFileError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    contents.push(b'\n');

    let io_err = |path: &Path, source: io::Error| JsonFileError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|source| io_err(parent, source))?;

    let Some(file_name) = path.file_name() else {
        return Err(io_err(path, io::Error::other("path has no file name")));
    };
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".{}.tmp.{}.{nanos}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let written = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .and_then(|mut file| {
            file.write_all(&contents)?;
            file.sync_all()
        });
    if let Err(source) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(&tmp_path, source));
    }

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(path, source));
    }

    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    // Why: Windows `rename` refuses to replace an existing target.
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}
