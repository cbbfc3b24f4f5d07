//! Two-state application driver: Startup (no document) and Editor.
//!
//! Per-state frame work is plain Bevy systems gated with
//! [`in_app_state`], so `transition` decides which of them run from the
//! next system on. Transition legality is not checked here; callers (the
//! lifecycle coordinator, the version switch and the document loader) are
//! the only ones that transition.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    /// Welcome screen, no document open.
    #[default]
    Startup,
    /// At least one document open.
    Editor,
}

#[derive(Resource, Default)]
pub struct AppStateMachine {
    current: AppState,
    transitions: usize,
}

impl AppStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> AppState {
        self.current
    }

    pub fn is_in_state(&self, state: AppState) -> bool {
        self.current == state
    }

    /// Number of effective (non-idempotent) transitions so far.
    pub fn transition_count(&self) -> usize {
        self.transitions
    }

    /// Move to `next`. Returns false (and does nothing) if already there.
    pub fn transition(&mut self, next: AppState) -> bool {
        if self.current == next {
            return false;
        }
        info!("AppState: {:?} -> {:?}", self.current, next);
        self.current = next;
        self.transitions += 1;
        true
    }
}

/// Run condition: the system runs only while the app is in `state`.
///
/// ```ignore
/// app.add_systems(Update, draw_welcome.run_if(in_app_state(AppState::Startup)));
/// ```
pub fn in_app_state(state: AppState) -> impl FnMut(Option<Res<AppStateMachine>>) -> bool + Clone {
    move |machine: Option<Res<AppStateMachine>>| machine.is_some_and(|m| m.is_in_state(state))
}
