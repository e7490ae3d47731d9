//! Startup sequencing and the assembled session.
//!
//! # Responsibility
//! - Run `ConfigLoad -> PrefsLoad -> DataLoad -> ModelReady` with per-stage
//!   fallbacks, then hand out a ready [`Session`].
//! - Persist preferences on every mutation and everything at shutdown.
//!
//! # Invariants
//! - No stage is fatal: each falls back to defaults, sample data or an empty
//!   roster and the sequence always reaches `ModelReady`.
//! - A corrupt roster file is never overwritten during startup, and only
//!   overwritten at shutdown when the roster was changed in the session.
//! - Every fallback and every failed save leaves a log record.

use crate::config::{read_config, save_config, Config, DEFAULT_CONFIG_FILE};
use crate::model::prefs::{GuiSettings, UserPrefs};
use crate::model::record::Record;
use crate::sample::sample_store;
use crate::storage::{
    JsonPrefsStorage, JsonRosterStorage, PrefsRepository, RosterRepository, StorageError,
    StorageResult,
};
use crate::store::record_store::RecordStore;
use crate::view::filtered_view::FilteredView;
use log::{error, info, warn};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Stages of the startup sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupStage {
    ConfigLoad,
    PrefsLoad,
    DataLoad,
    ModelReady,
}

impl Display for StartupStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::ConfigLoad => "config_load",
            Self::PrefsLoad => "prefs_load",
            Self::DataLoad => "data_load",
            Self::ModelReady => "model_ready",
        };
        f.write_str(label)
    }
}

/// How one load stage obtained its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Read from the existing file.
    Loaded,
    /// File was absent; defaults (or sample data for the roster) were used.
    Missing,
    /// File was present but unusable; defaults (or an empty roster) were used.
    Recovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupReport {
    pub config: LoadSource,
    pub prefs: LoadSource,
    pub data: LoadSource,
}

/// Everything the command and presentation layers need after startup.
pub struct Session<R: RosterRepository, P: PrefsRepository> {
    config: Config,
    prefs: UserPrefs,
    store: RecordStore,
    view: FilteredView,
    roster_storage: R,
    prefs_storage: P,
    report: StartupReport,
    saved_revision: u64,
}

/// Runs the full startup sequence against JSON files.
///
/// `config_path` defaults to [`DEFAULT_CONFIG_FILE`].
pub fn start_session(config_path: Option<&Path>) -> Session<JsonRosterStorage, JsonPrefsStorage> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let (config, config_source) = load_config_stage(&config_path);
    let prefs_storage = JsonPrefsStorage::new(config.user_prefs_file_path.clone());
    let (prefs, prefs_source) = load_prefs_stage(&prefs_storage);
    let roster_storage = JsonRosterStorage::new(prefs.roster_file_path.clone());
    Session::assemble(
        config,
        config_source,
        prefs,
        prefs_source,
        roster_storage,
        prefs_storage,
    )
}

fn load_config_stage(path: &Path) -> (Config, LoadSource) {
    info!(
        "event=startup module=startup stage={} status=start path={}",
        StartupStage::ConfigLoad,
        path.display()
    );
    let (config, source) = match read_config(path) {
        Ok(Some(config)) => (config, LoadSource::Loaded),
        Ok(None) => {
            info!(
                "event=startup module=startup stage={} status=missing",
                StartupStage::ConfigLoad
            );
            (Config::default(), LoadSource::Missing)
        }
        Err(err) => {
            warn!(
                "event=startup module=startup stage={} status=fallback reason=defaults {}",
                StartupStage::ConfigLoad,
                err.log_fields()
            );
            (Config::default(), LoadSource::Recovered)
        }
    };

    // Why: materialize missing or newly added fields for the next run.
    if let Err(err) = save_config(&config, path) {
        warn!(
            "event=config_save module=startup status=error {}",
            err.log_fields()
        );
    }
    (config, source)
}

fn load_prefs_stage<P: PrefsRepository>(storage: &P) -> (UserPrefs, LoadSource) {
    info!(
        "event=startup module=startup stage={} status=start path={}",
        StartupStage::PrefsLoad,
        storage.prefs_path().display()
    );
    let (prefs, source) = match storage.load_prefs() {
        Ok(Some(prefs)) => (prefs, LoadSource::Loaded),
        Ok(None) => (UserPrefs::default(), LoadSource::Missing),
        Err(err) => {
            warn!(
                "event=startup module=startup stage={} status=fallback reason=defaults {}",
                StartupStage::PrefsLoad,
                err.log_fields()
            );
            (UserPrefs::default(), LoadSource::Recovered)
        }
    };

    if let Err(err) = storage.save_prefs(&prefs) {
        warn!(
            "event=prefs_save module=startup status=error {}",
            err.log_fields()
        );
    }
    (prefs, source)
}

fn load_data_stage<R: RosterRepository>(storage: &R) -> (RecordStore, LoadSource) {
    info!(
        "event=startup module=startup stage={} status=start path={}",
        StartupStage::DataLoad,
        storage.roster_path().display()
    );
    match storage.load_roster() {
        Ok(Some(store)) => (store, LoadSource::Loaded),
        Ok(None) => {
            info!(
                "event=startup module=startup stage={} status=missing reason=sample_data",
                StartupStage::DataLoad
            );
            (sample_store(), LoadSource::Missing)
        }
        Err(err) => {
            warn!(
                "event=startup module=startup stage={} status=fallback reason=empty_roster {}",
                StartupStage::DataLoad,
                err.log_fields()
            );
            (RecordStore::new(), LoadSource::Recovered)
        }
    }
}

impl<R: RosterRepository, P: PrefsRepository> Session<R, P> {
    /// Runs the data stage with already-resolved config and prefs.
    ///
    /// Used by [`start_session`]; also lets callers plug in other gateways.
    pub fn assemble(
        config: Config,
        config_source: LoadSource,
        prefs: UserPrefs,
        prefs_source: LoadSource,
        roster_storage: R,
        prefs_storage: P,
    ) -> Self {
        let (store, data_source) = load_data_stage(&roster_storage);
        let report = StartupReport {
            config: config_source,
            prefs: prefs_source,
            data: data_source,
        };
        info!(
            "event=startup module=startup stage={} status=ok students={}",
            StartupStage::ModelReady,
            store.len()
        );

        let saved_revision = store.revision();
        Self {
            config,
            prefs,
            store,
            view: FilteredView::new(),
            roster_storage,
            prefs_storage,
            report,
            saved_revision,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn prefs(&self) -> &UserPrefs {
        &self.prefs
    }

    pub fn report(&self) -> StartupReport {
        self.report
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    pub fn view(&self) -> &FilteredView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut FilteredView {
        &mut self.view
    }

    pub fn current_view(&self) -> Vec<&Record> {
        self.view.current_view(&self.store)
    }

    pub fn roster_storage(&self) -> &R {
        &self.roster_storage
    }

    pub fn prefs_storage(&self) -> &P {
        &self.prefs_storage
    }

    /// `true` when the roster changed since it was loaded or last saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.store.revision() != self.saved_revision
    }

    /// Freezes the current roster and writes it to the data file.
    pub fn save_roster(&mut self) -> StorageResult<()> {
        let snapshot = self.store.snapshot();
        let revision = self.store.revision();
        self.roster_storage.save_roster(&snapshot).inspect_err(|err| {
            error!(
                "event=session_save module=startup status=error target=roster {}",
                err.log_fields()
            );
        })?;
        self.saved_revision = revision;
        Ok(())
    }

    pub fn set_gui_settings(&mut self, gui_settings: GuiSettings) -> StorageResult<()> {
        self.prefs.gui_settings = gui_settings;
        self.save_prefs()
    }

    /// Records a new data file location; it is used from the next startup on.
    pub fn set_roster_file_path(&mut self, path: impl Into<PathBuf>) -> StorageResult<()> {
        self.prefs.roster_file_path = path.into();
        self.save_prefs()
    }

    /// Clears the first-run flag once onboarding has been shown.
    pub fn acknowledge_first_run(&mut self) -> StorageResult<()> {
        if !self.prefs.is_first_time {
            return Ok(());
        }
        self.prefs.is_first_time = false;
        self.save_prefs()
    }

    /// Saves prefs, and the roster when it has unsaved changes; never panics.
    ///
    /// Returns the failures so callers can surface them before exiting.
    pub fn shutdown(mut self) -> Vec<StorageError> {
        info!("event=shutdown module=startup status=start");
        let mut failures = Vec::new();
        if let Err(err) = self.save_prefs() {
            failures.push(err);
        }
        // Why: an untouched roster may stand in for a corrupt file that must survive.
        if self.has_unsaved_changes() {
            if let Err(err) = self.save_roster() {
                failures.push(err);
            }
        } else {
            info!("event=shutdown module=startup status=skip target=roster reason=unchanged");
        }
        info!(
            "event=shutdown module=startup status={} failures={}",
            if failures.is_empty() { "ok" } else { "error" },
            failures.len()
        );
        failures
    }

    fn save_prefs(&self) -> StorageResult<()> {
        self.prefs_storage.save_prefs(&self.prefs).inspect_err(|err| {
            error!(
                "event=session_save module=startup status=error target=prefs {}",
                err.log_fields()
            );
        })
    }
}
