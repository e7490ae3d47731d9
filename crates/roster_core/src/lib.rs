//! Core domain logic for the tuition-center student roster.
//! This crate is the single source of truth for roster invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod sample;
pub mod startup;
pub mod storage;
pub mod store;
pub mod view;

pub use config::{read_config, save_config, Config, DEFAULT_CONFIG_FILE};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LoggingError,
};
pub use model::prefs::{GuiSettings, UserPrefs, WindowPosition};
pub use model::record::{
    Address, Email, Identity, Name, Phone, Record, RecordValidationError, Subject, Tag,
};
pub use startup::{start_session, LoadSource, Session, StartupReport, StartupStage};
pub use storage::codec::{decode, encode, MalformedDataError, RosterDocument};
pub use storage::{
    JsonPrefsStorage, JsonRosterStorage, PrefsRepository, RosterRepository, StorageError,
    StorageResult,
};
pub use store::record_store::{RecordStore, RosterSnapshot, StoreError, StoreResult};
pub use view::filtered_view::{FilteredView, RecordPredicate, SortOrder, ViewError};
pub use view::predicates;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
