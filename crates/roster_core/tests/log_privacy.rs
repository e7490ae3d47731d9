use log::{LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;
use roster_core::{
    save_config, start_session, Config, JsonPrefsStorage, LoadSource, PrefsRepository, UserPrefs,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

static CAPTURED: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(Vec::new()));

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        if let Ok(mut lines) = CAPTURED.lock() {
            lines.push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

fn install_capture() {
    // Tests in this binary share one logger; only the first install wins.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
}

fn captured() -> Vec<String> {
    CAPTURED.lock().map(|lines| lines.clone()).unwrap_or_default()
}

/// Config and prefs inside `dir`, with the roster file at `dir/roster.json`.
fn seed_workspace(dir: &TempDir) -> (PathBuf, PathBuf) {
    let prefs_path = dir.path().join("preferences.json");
    let config_path = dir.path().join("config.json");
    let roster_path = dir.path().join("roster.json");
    save_config(
        &Config {
            user_prefs_file_path: prefs_path.clone(),
            ..Config::default()
        },
        &config_path,
    )
    .expect("seed config");
    JsonPrefsStorage::new(&prefs_path)
        .save_prefs(&UserPrefs {
            roster_file_path: roster_path.clone(),
            ..UserPrefs::default()
        })
        .expect("seed prefs");
    (config_path, roster_path)
}

fn write_roster(path: &Path, student: serde_json::Value) {
    let document = serde_json::json!({ "version": 1, "students": [student] });
    fs::write(path, serde_json::to_vec_pretty(&document).unwrap()).unwrap();
}

#[test]
fn invalid_field_value_is_not_logged() {
    install_capture();
    let dir = tempfile::tempdir().expect("tempdir");
    let (config_path, roster_path) = seed_workspace(&dir);
    write_roster(
        &roster_path,
        serde_json::json!({
            "identity": "S1234567A",
            "name": "Jane Tan",
            "phone": "91234567",
            "email": "jane.secret at home",
            "address": "Blk 1 Clementi Road"
        }),
    );

    let session = start_session(Some(&config_path));
    assert_eq!(session.report().data, LoadSource::Recovered);

    let lines = captured();
    assert!(lines
        .iter()
        .any(|line| line.contains("status=fallback") && line.contains("field=students[0].email")));
    assert!(lines.iter().all(|line| !line.contains("jane.secret")));
}

#[test]
fn wrongly_typed_value_is_not_logged() {
    install_capture();
    let dir = tempfile::tempdir().expect("tempdir");
    let (config_path, roster_path) = seed_workspace(&dir);
    write_roster(
        &roster_path,
        serde_json::json!({
            "identity": "S7654321B",
            "name": "Kai Lim",
            "phone": 98765432,
            "email": "kai@example.com",
            "address": "Blk 2 Jurong West"
        }),
    );

    let session = start_session(Some(&config_path));
    assert_eq!(session.report().data, LoadSource::Recovered);

    let lines = captured();
    assert!(lines.iter().any(|line| {
        line.contains("error_code=roster_unreadable") && line.contains("category=Data")
    }));
    assert!(lines.iter().all(|line| !line.contains("98765432")));
}
