//! Editor configuration file.
//!
//! Loaded from JSON at startup (`assets/map_editor/studio.json` unless
//! `--config` says otherwise). Every field has a default, so a partial file
//! or no file at all is fine.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "assets/map_editor/studio.json";

/// Errors that can occur while reading or writing the config file.
#[derive(Debug)]
pub enum ConfigError {
    /// File system error
    Io(std::io::Error),
    /// JSON (de)serialization error
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Editor settings.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Window title.
    pub title: String,
    /// Window resolution (width, height).
    pub resolution: (u32, u32),
    /// Filter string handed to Bevy's `LogPlugin`.
    pub log_filter: String,
    /// Undo entries kept per session. 0 keeps everything.
    pub undo_limit: usize,
    /// Toast lifetime in milliseconds.
    pub notification_ms: u64,
    /// Toast shown after a client version switch.
    pub switch_notice: String,
    /// Name shown in the unsaved-changes modal during a version switch.
    pub unsaved_prompt_name: String,
    /// Size of maps created with File > New.
    pub default_map_size: (usize, usize),
    /// Client version loaded with the first new map.
    pub default_client_version: u32,
    /// Directory new maps are saved to.
    pub maps_dir: PathBuf,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            title: "Map Studio".to_string(),
            resolution: (1280, 800),
            log_filter: "info,wgpu=error,naga=warn".to_string(),
            undo_limit: 500,
            notification_ms: 2000,
            switch_notice: crate::session::DEFAULT_SWITCH_NOTICE.to_string(),
            unsaved_prompt_name: crate::session::DEFAULT_PROMPT_NAME.to_string(),
            default_map_size: (256, 256),
            default_client_version: 1098,
            maps_dir: PathBuf::from("maps"),
        }
    }
}

impl StudioConfig {
    /// Read a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Read a config file, falling back to defaults if it is missing or
    /// malformed.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("StudioConfig: no config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                info!("StudioConfig: loaded {:?}", path);
                config
            }
            Err(e) => {
                warn!("StudioConfig: failed to load {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Write the config as pretty-printed JSON, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
