//! Deferred close and deferred destruction of sessions.
//!
//! Tab close controls are drawn while the tab list is being iterated, and the
//! draw list of the current frame may still reference the session's GPU
//! state. Closes requested from there go through `request_close_tab`, which
//! only records the index. Once per frame, after the UI/render pass,
//! `process_deferred_actions` runs the fixed protocol:
//!
//! 1. extract the requested sessions into the destroy queue
//! 2. detach the UI binder if no session is active anymore
//! 3. destroy render state for every queued session, then drop the sessions
//! 4. on the last tab, release client resources and return to Startup
//!
//! Draining the destroy queue is the only place session GPU state is freed,
//! apart from the synchronous `SessionRegistry::close_tab`.

use super::app_state::{AppState, AppStateMachine};
use super::capabilities::{Detachable, Resettable};
use super::editor_session::EditorSession;
use super::registry::SessionRegistry;
use super::render_state::RenderStateStore;
use bevy::prelude::*;

/// What one `process_deferred_actions` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeferredReport {
    /// Sessions extracted from the registry this frame.
    pub extracted: usize,
    /// Sessions destroyed this frame (includes batches queued earlier).
    pub destroyed: usize,
    /// Whether the UI binder was told to detach.
    pub detached: bool,
    /// Whether the app went back to the Startup state.
    pub returned_to_startup: bool,
}

#[derive(Resource, Default)]
pub struct LifecycleCoordinator {
    pending_close: Vec<usize>,
    pending_destroy: Vec<EditorSession>,
}

impl LifecycleCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for tab `index` to be closed at the end of this frame.
    ///
    /// Safe to call mid-render: nothing is removed or freed until
    /// `process_deferred_actions`. Repeated requests for the same index in
    /// one frame collapse into one.
    ///
    /// Requests are tab indices. Code that removes a tab synchronously in the
    /// same frame (`SessionRegistry::close_tab`) must call `note_tab_removed`
    /// so the recorded indices keep pointing at the tabs the user clicked.
    pub fn request_close_tab(&mut self, index: usize) {
        info!("SessionLifecycle: deferring close of tab {}", index);
        self.pending_close.push(index);
    }

    /// Re-aim pending close requests after tab `index` was removed outside
    /// the deferred path. A request for `index` itself is dropped and
    /// requests above it shift down by one.
    pub fn note_tab_removed(&mut self, index: usize) {
        self.pending_close.retain(|&i| i != index);
        for pending in &mut self.pending_close {
            if *pending > index {
                *pending -= 1;
            }
        }
    }

    /// Hand an already extracted batch over for destruction at the next drain.
    pub fn queue_sessions_for_destruction(&mut self, sessions: Vec<EditorSession>) {
        if !sessions.is_empty() {
            debug!("SessionLifecycle: queued {} sessions for destruction", sessions.len());
        }
        self.pending_destroy.extend(sessions);
    }

    /// Number of close requests recorded this frame (duplicates included).
    pub fn pending_close_count(&self) -> usize {
        self.pending_close.len()
    }

    pub fn has_pending_destruction(&self) -> bool {
        !self.pending_destroy.is_empty()
    }

    /// Sessions waiting in the destroy queue.
    pub fn pending_destruction_count(&self) -> usize {
        self.pending_destroy.len()
    }

    /// Step 1: move every requested session from the registry into the
    /// destroy queue. Returns how many were extracted.
    ///
    /// Indices are deduplicated and handled highest first so earlier
    /// removals cannot shift later ones. Indices that no longer exist are
    /// skipped.
    pub fn extract_deferred_sessions(&mut self, registry: &mut SessionRegistry) -> usize {
        if self.pending_close.is_empty() {
            return 0;
        }
        let mut indices = std::mem::take(&mut self.pending_close);
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();

        let mut extracted = 0;
        for index in indices {
            if index >= registry.tab_count() {
                continue;
            }
            info!("SessionLifecycle: extracting tab {} for deferred destruction", index);
            if let Some(session) = registry.extract_session(index) {
                self.pending_destroy.push(session);
                extracted += 1;
            }
        }
        extracted
    }

    /// Step 3: destroy render state for each queued session, then drop them.
    pub fn destroy_pending_sessions(&mut self, store: &mut dyn RenderStateStore) -> usize {
        if self.pending_destroy.is_empty() {
            return 0;
        }
        let count = self.pending_destroy.len();
        info!("SessionLifecycle: destroying {} deferred sessions", count);
        for session in &self.pending_destroy {
            store.destroy(session.id());
        }
        self.pending_destroy.clear();
        count
    }

    /// Run the whole per-frame protocol. Call exactly once per frame, after
    /// the UI/render pass.
    pub fn process_deferred_actions(
        &mut self,
        registry: &mut SessionRegistry,
        store: &mut dyn RenderStateStore,
        binder: Option<&mut dyn Detachable>,
        state: &mut AppStateMachine,
        cleanup: Option<&mut dyn Resettable>,
    ) -> DeferredReport {
        let mut report = DeferredReport {
            extracted: self.extract_deferred_sessions(registry),
            ..Default::default()
        };

        // Detach before destroying anything the binder may still point at.
        if (report.extracted > 0 || self.has_pending_destruction())
            && registry.active_session().is_none()
        {
            if let Some(binder) = binder {
                binder.detach();
                report.detached = true;
            }
        }

        report.destroyed = self.destroy_pending_sessions(store);

        if registry.is_empty() && state.is_in_state(AppState::Editor) {
            if let Some(cleanup) = cleanup {
                info!("SessionLifecycle: cleaning up client resources");
                cleanup.reset();
            }
            state.transition(AppState::Startup);
            report.returned_to_startup = true;
        }

        report
    }
}
