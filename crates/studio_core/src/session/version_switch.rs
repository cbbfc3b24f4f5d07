//! Switching the active game-client version.
//!
//! A switch throws away every open session and everything loaded from the
//! current client. Unsaved work is never dropped silently: `initiate` opens
//! the confirmation modal instead when any session is modified, and the
//! caller runs `perform` once the user has chosen Save or Discard.
//!
//! `perform` never frees session GPU state itself. It extracts all sessions
//! and queues them on the `LifecycleCoordinator`, which destroys them in its
//! regular per-frame step.

use super::app_state::{AppState, AppStateMachine};
use super::capabilities::{ConfirmationGate, Detachable, Notifier, Resettable, SaveCallback};
use super::lifecycle::LifecycleCoordinator;
use super::registry::SessionRegistry;
use bevy::prelude::*;

/// Toast shown once a switch has completed.
pub const DEFAULT_SWITCH_NOTICE: &str = "Ready to open new map";

/// Name shown in the unsaved-changes modal during a switch.
pub const DEFAULT_PROMPT_NAME: &str = "All open maps";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Waiting for the user to answer the unsaved-changes modal.
    Pending,
    /// The switch ran to completion inside `initiate`.
    Completed,
}

impl SwitchOutcome {
    pub fn is_pending(self) -> bool {
        self == SwitchOutcome::Pending
    }
}

/// Teardown steps run by `VersionSwitch::perform`, in field order.
///
/// Every step is optional. The UI is unbound before cached references are
/// cleared so no component reads a released reference in between.
#[derive(Default)]
pub struct VersionSwitchHooks<'a> {
    /// Release the shared tile renderer.
    pub renderer: Option<&'a mut dyn Resettable>,
    /// Release everything loaded from the current client version.
    pub client_resources: Option<&'a mut dyn Resettable>,
    /// Unbind UI observers of the (now absent) active session.
    pub ui: Option<&'a mut dyn Detachable>,
    /// Clear references cached by unrelated components.
    pub cached_references: Option<&'a mut dyn Resettable>,
    /// State machine to send back to Startup.
    pub state: Option<&'a mut AppStateMachine>,
    /// Where the completion notice goes.
    pub notifier: Option<&'a mut dyn Notifier>,
}

/// One version switch over a registry and its lifecycle coordinator.
pub struct VersionSwitch<'a> {
    registry: &'a mut SessionRegistry,
    lifecycle: &'a mut LifecycleCoordinator,
    notice: &'a str,
    prompt_name: &'a str,
}

impl<'a> VersionSwitch<'a> {
    pub fn new(registry: &'a mut SessionRegistry, lifecycle: &'a mut LifecycleCoordinator) -> Self {
        Self {
            registry,
            lifecycle,
            notice: DEFAULT_SWITCH_NOTICE,
            prompt_name: DEFAULT_PROMPT_NAME,
        }
    }

    /// Override the completion notice.
    pub fn with_notice(mut self, notice: &'a str) -> Self {
        self.notice = notice;
        self
    }

    /// Override the name shown in the unsaved-changes modal.
    pub fn with_prompt_name(mut self, prompt_name: &'a str) -> Self {
        self.prompt_name = prompt_name;
        self
    }

    /// Start a switch.
    ///
    /// With unsaved changes, arms `on_save` on the gate, shows it and returns
    /// `Pending` without touching anything else. Otherwise runs `perform`
    /// immediately and returns `Completed`.
    pub fn initiate(
        &mut self,
        gate: Option<&mut dyn ConfirmationGate>,
        on_save: SaveCallback,
        hooks: VersionSwitchHooks<'_>,
    ) -> SwitchOutcome {
        if self.registry.has_unsaved_changes() {
            match gate {
                Some(gate) => {
                    gate.set_save_callback(on_save);
                    gate.show(self.prompt_name);
                }
                None => warn!("VersionSwitch: unsaved changes and no confirmation modal, holding switch"),
            }
            return SwitchOutcome::Pending;
        }

        self.perform(hooks);
        SwitchOutcome::Completed
    }

    /// Detach every session, queue them for destruction and run the
    /// teardown steps.
    pub fn perform(&mut self, hooks: VersionSwitchHooks<'_>) {
        info!("VersionSwitch: switching client version...");

        let sessions = self.registry.extract_all_sessions();
        info!("VersionSwitch: detached {} sessions", sessions.len());
        self.lifecycle.queue_sessions_for_destruction(sessions);

        let VersionSwitchHooks {
            renderer,
            client_resources,
            ui,
            cached_references,
            state,
            notifier,
        } = hooks;

        if let Some(renderer) = renderer {
            renderer.reset();
        }
        if let Some(client_resources) = client_resources {
            client_resources.reset();
        }
        if let Some(ui) = ui {
            ui.detach();
        }
        if let Some(cached) = cached_references {
            cached.reset();
        }
        if let Some(state) = state {
            state.transition(AppState::Startup);
        }

        info!("VersionSwitch: client version resources unloaded, ready for new version");

        if let Some(notifier) = notifier {
            notifier.notify(self.notice);
        }
    }
}
