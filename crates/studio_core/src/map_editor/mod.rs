//! Map Editor Module
//!
//! Thin ImGui shell around the session core: menu bar, map tabs, the
//! unsaved-changes modal and toasts.
//!
//! # Architecture
//!
//! - `MapDocument`: the document held by each session
//! - `UnsavedChangesModal` / `Toasts`: the confirmation gate and notifier
//! - `EditorShellPlugin`: menu commands and the client version switch flow
//! - `map_io`: JSON save/load for maps, `JsonMapSaver` for the Save choice
//! - `draw_menu_and_dialogs` / `draw_welcome` / `draw_map_tabs`: the ImGui
//!   pass, one system per state (tab close buttons use the deferred path)
//! - `MapEditorApp`: fluent builder for the whole application
//!
//! # Example
//!
//! ```ignore
//! use studio_core::map_editor::MapEditorApp;
//!
//! fn main() {
//!     MapEditorApp::new().with_cli_args().run();
//! }
//! ```

pub mod app;
pub mod dialogs;
pub mod document;
pub mod map_io;
pub mod shell;
pub mod ui;

pub use app::{AutoExitConfig, MapEditorApp};
pub use dialogs::{ModalChoice, Toast, Toasts, UnsavedChangesModal, UNSAVED_MODAL_ID};
pub use document::MapDocument;
pub use map_io::{load_map, save_map, JsonMapSaver, MapIoError, MapIoResult};
pub use shell::{ClientSelection, EditorShellPlugin, EditorShellSet, MenuRequests, SaveAllFlag};
pub use ui::{draw_map_tabs, draw_menu_and_dialogs, draw_welcome, TabStripState};
