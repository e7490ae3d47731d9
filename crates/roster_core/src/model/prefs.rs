//! User preferences model.
//!
//! # Responsibility
//! - Hold window geometry, the roster data file location and the first-run flag.
//!
//! # Invariants
//! - Every field has a default so older or partial preference files still load.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_WINDOW_WIDTH: f64 = 740.0;
const DEFAULT_WINDOW_HEIGHT: f64 = 600.0;
const DEFAULT_ROSTER_FILE: &str = "data/roster.json";

/// Top-left corner of the main window in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

/// Window geometry remembered between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiSettings {
    pub window_width: f64,
    pub window_height: f64,
    /// `None` lets the presentation layer center the window.
    pub window_position: Option<WindowPosition>,
}

impl Default for GuiSettings {
    fn default() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            window_position: None,
        }
    }
}

/// Per-user preferences, persisted independently of roster data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPrefs {
    pub gui_settings: GuiSettings,
    pub roster_file_path: PathBuf,
    /// Cleared after the first session has shown its onboarding help.
    pub is_first_time: bool,
}

impl Default for UserPrefs {
    fn default() -> Self {
        Self {
            gui_settings: GuiSettings::default(),
            roster_file_path: PathBuf::from(DEFAULT_ROSTER_FILE),
            is_first_time: true,
        }
    }
}

impl UserPrefs {
    pub fn roster_file_path(&self) -> &Path {
        &self.roster_file_path
    }
}
