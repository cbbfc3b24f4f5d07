//! Narrow capability traits used by the lifecycle and version switch code.
//!
//! Collaborators outside the session core (UI binders, resource pools,
//! dialogs, toasts) are reached only through these traits. Every reference
//! to one of them is optional; a missing collaborator means "do nothing".

use super::editor_session::EditorSession;
use std::path::PathBuf;

/// Something holding a view onto the active session that can let go of it.
pub trait Detachable {
    /// Drop every reference to the currently bound session.
    fn detach(&mut self);
}

/// A resource pool or cache that can be released wholesale.
pub trait Resettable {
    /// Release everything held.
    fn reset(&mut self);
}

/// Callback run when the user picks "Save" in a confirmation modal.
pub type SaveCallback = Box<dyn FnMut() + Send + Sync>;

/// A Save/Discard/Cancel confirmation modal.
pub trait ConfirmationGate {
    /// Install the action taken when the user chooses to save.
    fn set_save_callback(&mut self, callback: SaveCallback);

    /// Open the modal for the named document(s).
    fn show(&mut self, name: &str);
}

/// User-facing notification sink (toasts).
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Boxed error returned by a `DocumentSaver`.
pub type SaveError = Box<dyn std::error::Error + Send + Sync>;

/// Writes a session's document to persistent storage.
pub trait DocumentSaver {
    /// Save `session` and return the path it was written to.
    fn save(&mut self, session: &EditorSession) -> Result<PathBuf, SaveError>;
}
