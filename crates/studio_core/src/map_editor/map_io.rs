//! Map save/load.
//!
//! Maps are stored as pretty-printed JSON (`<name>.json`). `JsonMapSaver`
//! plugs this into `SessionRegistry::save_modified` so the version switch's
//! "Save" choice writes every modified map before anything is torn down.
//!
//! # Example
//!
//! ```ignore
//! use studio_core::map_editor::{MapDocument, save_map, load_map};
//!
//! let mut map = MapDocument::new("harbor", 64, 64, 1098);
//! map.set(3, 4, 102);
//! save_map(&map, "maps/harbor.json").unwrap();
//!
//! let loaded = load_map("maps/harbor.json").unwrap();
//! ```

use super::document::MapDocument;
use crate::session::{DocumentSaver, EditorSession, SaveError};
use std::path::{Path, PathBuf};

/// Errors that can occur during map I/O.
#[derive(Debug)]
pub enum MapIoError {
    /// File system error
    Io(std::io::Error),
    /// JSON serialization error
    Json(serde_json::Error),
    /// File parsed but does not describe a valid map
    InvalidFormat(String),
}

impl std::fmt::Display for MapIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapIoError::Io(e) => write!(f, "IO error: {}", e),
            MapIoError::Json(e) => write!(f, "JSON error: {}", e),
            MapIoError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
        }
    }
}

impl std::error::Error for MapIoError {}

impl From<std::io::Error> for MapIoError {
    fn from(e: std::io::Error) -> Self {
        MapIoError::Io(e)
    }
}

impl From<serde_json::Error> for MapIoError {
    fn from(e: serde_json::Error) -> Self {
        MapIoError::Json(e)
    }
}

/// Result type for map I/O operations.
pub type MapIoResult<T> = Result<T, MapIoError>;

/// Write `map` to `path` as JSON, creating parent directories as needed.
pub fn save_map<P: AsRef<Path>>(map: &MapDocument, path: P) -> MapIoResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(map)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read a map written by `save_map`.
pub fn load_map<P: AsRef<Path>>(path: P) -> MapIoResult<MapDocument> {
    let contents = std::fs::read_to_string(path)?;
    let map: MapDocument = serde_json::from_str(&contents)?;
    if !map.is_consistent() {
        return Err(MapIoError::InvalidFormat(format!(
            "{} tiles for a {}x{} map",
            map.tiles.len(),
            map.width,
            map.height
        )));
    }
    Ok(map)
}

/// Saves map sessions as JSON.
///
/// Sessions that were opened from or saved to a file keep that path; new
/// maps go to `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct JsonMapSaver {
    dir: PathBuf,
}

impl JsonMapSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where `session` would be written.
    pub fn target_path(&self, session: &EditorSession) -> PathBuf {
        match session.file_path() {
            Some(path) => path.to_path_buf(),
            None => self.dir.join(format!("{}.json", session.document().name())),
        }
    }
}

impl DocumentSaver for JsonMapSaver {
    fn save(&mut self, session: &EditorSession) -> Result<PathBuf, SaveError> {
        let map = session
            .document_as::<MapDocument>()
            .ok_or_else(|| format!("{} is not a map document", session.display_name()))?;
        let path = self.target_path(session);
        save_map(map, &path)?;
        Ok(path)
    }
}
