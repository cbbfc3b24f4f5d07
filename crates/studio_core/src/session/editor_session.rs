//! One open document plus its editing view.
//!
//! An `EditorSession` bundles the document handle, the modification flag,
//! per-tab view state and the undo history. Sessions are only constructed by
//! `SessionRegistry::open_session`, and only dropped by the sync close path
//! or by `LifecycleCoordinator` draining its destroy queue.

use super::history::{HistoryEntry, UndoHistory};
use super::id::SessionId;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A document handle. The session core never looks inside it.
pub trait Document: Send + Sync + 'static {
    /// Name used when the session has no file path yet ("Untitled-1").
    fn name(&self) -> &str;

    /// Downcast support for the editor shell.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support for the editor shell.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Hook fired whenever a session's modification flag is written.
pub type ModifiedHook = Arc<dyn Fn(SessionId, bool) + Send + Sync>;

/// Camera and display settings preserved when switching tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub camera_x: f32,
    pub camera_y: f32,
    pub zoom: f32,
    pub current_floor: i32,
    pub lighting_enabled: bool,
    pub ambient_light: i32,
    pub show_ingame_box: bool,
    pub show_minimap: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            camera_x: 0.0,
            camera_y: 0.0,
            zoom: 1.0,
            current_floor: 7,
            lighting_enabled: false,
            ambient_light: 128,
            show_ingame_box: false,
            show_minimap: false,
        }
    }
}

/// Minimap position preserved when switching tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimapState {
    pub center_x: i32,
    pub center_y: i32,
    pub floor: i16,
    /// 0 = 1:1, 1 = 1:2, 2 = 1:4, 3 = 1:8, 4 = 1:16
    pub zoom_level: i32,
}

impl Default for MinimapState {
    fn default() -> Self {
        Self {
            center_x: 0,
            center_y: 0,
            floor: 7,
            zoom_level: 2,
        }
    }
}

/// Per-tab editing session.
pub struct EditorSession {
    id: SessionId,
    document: Box<dyn Document>,
    path: Option<PathBuf>,
    modified: bool,
    on_modified: Option<ModifiedHook>,
    history: UndoHistory,
    /// Camera/display state for this tab.
    pub view: ViewState,
    /// Minimap state for this tab.
    pub minimap: MinimapState,
}

impl EditorSession {
    pub(crate) fn new(
        id: SessionId,
        document: Box<dyn Document>,
        path: Option<PathBuf>,
        undo_limit: usize,
    ) -> Self {
        Self {
            id,
            document,
            path,
            modified: false,
            on_modified: None,
            history: UndoHistory::with_limit(undo_limit),
            view: ViewState::default(),
            minimap: MinimapState::default(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn document(&self) -> &dyn Document {
        self.document.as_ref()
    }

    /// Downcast the document to a concrete type.
    pub fn document_as<T: Document>(&self) -> Option<&T> {
        self.document.as_any().downcast_ref::<T>()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// File name when saved, otherwise the document's own name.
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.document.name().to_string())
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Write the modification flag and fire the hook.
    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
        if let Some(hook) = &self.on_modified {
            hook(self.id, modified);
        }
    }

    pub(crate) fn set_modified_hook(&mut self, hook: Option<ModifiedHook>) {
        self.on_modified = hook;
    }

    /// Record an edit on the undo stack and mark the session modified.
    pub fn record(&mut self, description: impl Into<String>) {
        self.history.push(HistoryEntry::new(description));
        self.set_modified(true);
    }

    pub fn undo(&mut self) -> Option<String> {
        let description = self.history.undo()?;
        self.set_modified(true);
        Some(description)
    }

    pub fn redo(&mut self) -> Option<String> {
        let description = self.history.redo()?;
        self.set_modified(true);
        Some(description)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("id", &self.id)
            .field("name", &self.display_name())
            .field("modified", &self.modified)
            .finish()
    }
}
