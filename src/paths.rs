//! Where the layer keeps its log and settings file.

use std::path::{Path, PathBuf};

use crate::negotiate::LAYER_NAME;

/// Overrides the layer home directory.
pub const HOME_ENV: &str = "WIDESCREEN_FOV_HOME";

/// Directory holding `<layer>.log` and `<layer>.ini`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerPaths {
    home: PathBuf,
}

impl LayerPaths {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// `$WIDESCREEN_FOV_HOME`, else the per-user local data directory
    /// (`%LOCALAPPDATA%` on Windows), else the working directory.
    pub fn discover() -> Self {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Self::new(home);
        }
        directories::BaseDirs::new().map_or_else(
            || Self::new("."),
            |dirs| Self::new(dirs.data_local_dir()),
        )
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn log_file(&self) -> PathBuf {
        self.home.join(format!("{LAYER_NAME}.log"))
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join(format!("{LAYER_NAME}.ini"))
    }
}
