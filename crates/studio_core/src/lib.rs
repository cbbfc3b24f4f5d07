//! Core library for Map Studio.
//!
//! This crate provides:
//! - The multi-tab session core (`session`): open sessions, deferred close
//!   and destruction, client version switching, the Startup/Editor state
//! - Editor configuration (`config`)
//! - The ImGui editor shell and app builder (`map_editor`)

pub mod config;
pub mod map_editor;
pub mod session;

pub use config::{ConfigError, ConfigResult, StudioConfig, DEFAULT_CONFIG_PATH};
pub use map_editor::{EditorShellPlugin, MapDocument, MapEditorApp};
pub use session::{
    AppState, AppStateMachine, LifecycleCoordinator, SessionId, SessionLifecyclePlugin,
    SessionRegistry, SessionSet,
};
