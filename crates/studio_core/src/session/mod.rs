//! Multi-tab session core.
//!
//! Owns the open sessions (tabs), the active-tab index, the Startup/Editor
//! application state and the rules for when a session may be destroyed.
//!
//! # Lifecycle rules
//!
//! - A session is created only by `SessionRegistry::open_session`, which also
//!   creates its render state.
//! - Tab close buttons drawn inside the tab loop call
//!   `LifecycleCoordinator::request_close_tab`. The close takes effect in
//!   `Last`, after the frame's draw list is finished with the session.
//! - A version switch extracts every session and queues them for destruction
//!   on the same coordinator. It never frees GPU state inline.
//!
//! Collaborators outside this module (dialogs, toasts, UI panels) are reached
//! through the traits in [`capabilities`].

pub mod app_state;
pub mod binding;
pub mod capabilities;
pub mod client_version;
pub mod editor_session;
pub mod history;
pub mod id;
pub mod lifecycle;
pub mod loader;
pub mod plugin;
pub mod registry;
pub mod render_state;
pub mod version_switch;

pub use app_state::{in_app_state, AppState, AppStateMachine};
pub use binding::{SessionBinding, TabChanges};
pub use capabilities::{
    ConfirmationGate, Detachable, DocumentSaver, Notifier, Resettable, SaveCallback, SaveError,
};
pub use client_version::{ClientData, ClientDataCache, ClientVersionManager};
pub use editor_session::{Document, EditorSession, MinimapState, ModifiedHook, ViewState};
pub use history::{HistoryEntry, UndoHistory};
pub use id::{SessionId, SessionIdGenerator};
pub use lifecycle::{DeferredReport, LifecycleCoordinator};
pub use loader::DocumentLoadQueue;
pub use plugin::{PendingVersionSwitch, SessionLifecyclePlugin, SessionSet};
pub use registry::{SaveReport, SessionRegistry, TabListener};
pub use render_state::{MapRenderer, RenderState, RenderStateStore, RenderStates};
pub use version_switch::{
    SwitchOutcome, VersionSwitch, VersionSwitchHooks, DEFAULT_PROMPT_NAME, DEFAULT_SWITCH_NOTICE,
};
