//! Unsaved-changes modal and toast notifications.
//!
//! Both are plain resources so the session logic can drive them without an
//! ImGui context. `ui::draw_dialogs` renders them.

use crate::session::{ConfirmationGate, Notifier, SaveCallback};
use bevy::prelude::*;

/// ImGui popup id of the unsaved-changes modal.
pub const UNSAVED_MODAL_ID: &str = "Unsaved Changes";

/// What the user picked in the unsaved-changes modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalChoice {
    Save,
    Discard,
    Cancel,
}

/// Save/Discard/Cancel modal shown before destructive operations.
#[derive(Resource, Default)]
pub struct UnsavedChangesModal {
    name: String,
    visible: bool,
    /// Set by `show`, consumed by the UI when it opens the popup.
    open_requested: bool,
    on_save: Option<SaveCallback>,
    choice: Option<ModalChoice>,
}

impl UnsavedChangesModal {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Name of the document(s) the modal asks about.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true once after `show`, so the UI opens the popup one time.
    pub fn take_open_request(&mut self) -> bool {
        std::mem::take(&mut self.open_requested)
    }

    /// Close the modal with the user's answer. `Save` runs the armed save
    /// callback first. The callback is dropped either way.
    pub fn resolve(&mut self, choice: ModalChoice) {
        if !self.visible {
            return;
        }
        if choice == ModalChoice::Save {
            if let Some(on_save) = self.on_save.as_mut() {
                on_save();
            }
        }
        debug!("UnsavedChangesModal: {:?} for '{}'", choice, self.name);
        self.on_save = None;
        self.visible = false;
        self.open_requested = false;
        self.choice = Some(choice);
    }

    /// Answer given since the last call, if any.
    pub fn take_choice(&mut self) -> Option<ModalChoice> {
        self.choice.take()
    }
}

impl ConfirmationGate for UnsavedChangesModal {
    fn set_save_callback(&mut self, callback: SaveCallback) {
        self.on_save = Some(callback);
    }

    fn show(&mut self, name: &str) {
        self.name = name.to_string();
        self.visible = true;
        self.open_requested = true;
        self.choice = None;
    }
}

/// One on-screen notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    /// Milliseconds left before it disappears.
    pub remaining_ms: u64,
}

/// Short-lived notifications drawn in the corner of the window.
#[derive(Resource, Debug)]
pub struct Toasts {
    lifetime_ms: u64,
    active: Vec<Toast>,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(2000)
    }
}

impl Toasts {
    pub fn new(lifetime_ms: u64) -> Self {
        Self {
            lifetime_ms,
            active: Vec::new(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.active.iter()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Age every toast and drop the expired ones.
    pub fn tick(&mut self, elapsed_ms: u64) {
        for toast in &mut self.active {
            toast.remaining_ms = toast.remaining_ms.saturating_sub(elapsed_ms);
        }
        self.active.retain(|t| t.remaining_ms > 0);
    }
}

impl Notifier for Toasts {
    fn notify(&mut self, message: &str) {
        info!("Toast: {}", message);
        self.active.push(Toast {
            message: message.to_string(),
            remaining_ms: self.lifetime_ms,
        });
    }
}
