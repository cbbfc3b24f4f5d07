//! The workspace's view onto the active session.
//!
//! Panels (map view, minimap, tile browser) read the bound session id from
//! here instead of holding references into the registry. Detaching clears
//! the binding before any session it pointed at is destroyed.
//!
//! The binding follows the registry through its tab-changed events:
//! `TabChanges` is registered as a `TabListener` and queues every change,
//! and the plugin re-syncs the binding whenever the queue is non-empty.

use super::capabilities::Detachable;
use super::editor_session::{MinimapState, ViewState};
use super::id::SessionId;
use super::registry::{SessionRegistry, TabListener};
use bevy::prelude::*;
use std::sync::{Arc, Mutex, PoisonError};

type ChangeQueue = Arc<Mutex<Vec<(Option<usize>, Option<usize>)>>>;

/// Tab-changed events recorded by the registry, drained by the binding.
#[derive(Resource, Clone, Default)]
pub struct TabChanges(ChangeQueue);

impl TabChanges {
    /// Listener feeding this queue, for `SessionRegistry::add_listener`.
    pub fn listener(&self) -> Box<dyn TabListener> {
        Box::new(TabChangeRecorder(self.0.clone()))
    }

    /// Take every change recorded since the last drain, oldest first.
    pub fn drain(&self) -> Vec<(Option<usize>, Option<usize>)> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

struct TabChangeRecorder(ChangeQueue);

impl TabListener for TabChangeRecorder {
    fn on_tab_changed(&mut self, old: Option<usize>, new: Option<usize>) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((old, new));
    }
}

#[derive(Resource, Debug, Default)]
pub struct SessionBinding {
    bound: Option<SessionId>,
    /// View state of the bound tab, written back when switching away.
    pub view: ViewState,
    pub minimap: MinimapState,
    detach_count: usize,
}

impl SessionBinding {
    pub fn bound(&self) -> Option<SessionId> {
        self.bound
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// How many times the binding was detached.
    pub fn detach_count(&self) -> usize {
        self.detach_count
    }

    /// Follow the registry's active tab.
    ///
    /// When the active session changes, the previous tab's view state is
    /// written back (if that tab still exists) and the new tab's view state
    /// is loaded.
    pub fn sync(&mut self, registry: &mut SessionRegistry) {
        let active = registry.active_session().map(|s| s.id());
        if active == self.bound {
            return;
        }

        if let Some(previous) = self.bound.and_then(|id| registry.index_of(id)) {
            if let Some(session) = registry.session_mut(previous) {
                session.view = self.view.clone();
                session.minimap = self.minimap.clone();
            }
        }

        match registry.active_session() {
            Some(session) => {
                self.bound = Some(session.id());
                self.view = session.view.clone();
                self.minimap = session.minimap.clone();
                debug!("SessionBinding: bound {}", session.id());
            }
            None => self.detach(),
        }
    }
}

impl Detachable for SessionBinding {
    fn detach(&mut self) {
        if self.bound.take().is_some() {
            debug!("SessionBinding: detached");
        }
        self.view = ViewState::default();
        self.minimap = MinimapState::default();
        self.detach_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::editor_session::tests::TestDoc;
    use crate::session::render_state::RenderStates;

    #[test]
    fn test_sync_follows_active_tab() {
        let mut store = RenderStates::new();
        let mut registry = SessionRegistry::new();
        registry.open_session(Box::new(TestDoc("a")), None, &mut store);
        let mut binding = SessionBinding::default();

        binding.sync(&mut registry);
        assert_eq!(binding.bound(), registry.active_session().map(|s| s.id()));
    }

    #[test]
    fn test_sync_writes_back_view_state() {
        let mut store = RenderStates::new();
        let mut registry = SessionRegistry::new();
        registry.open_session(Box::new(TestDoc("a")), None, &mut store);
        let mut binding = SessionBinding::default();
        binding.sync(&mut registry);

        binding.view.zoom = 2.5;
        registry.open_session(Box::new(TestDoc("b")), None, &mut store);
        binding.sync(&mut registry);

        assert_eq!(registry.session(0).unwrap().view.zoom, 2.5);
        assert_eq!(binding.view.zoom, 1.0);
    }

    #[test]
    fn test_sync_close_event_unbinds_destroyed_session() {
        let mut store = RenderStates::new();
        let changes = TabChanges::default();
        let mut registry = SessionRegistry::new();
        registry.add_listener(changes.listener());
        registry.open_session(Box::new(TestDoc("a")), None, &mut store);
        let mut binding = SessionBinding::default();
        assert_eq!(changes.drain(), vec![(None, Some(0))]);
        binding.sync(&mut registry);
        assert!(binding.is_bound());

        registry.close_tab(0, &mut store);
        assert_eq!(changes.drain(), vec![(None, None)]);
        binding.sync(&mut registry);
        assert!(!binding.is_bound());
        assert!(changes.drain().is_empty());
    }

    #[test]
    fn test_detach_clears_binding() {
        let mut store = RenderStates::new();
        let mut registry = SessionRegistry::new();
        registry.open_session(Box::new(TestDoc("a")), None, &mut store);
        let mut binding = SessionBinding::default();
        binding.sync(&mut registry);

        binding.detach();
        assert!(!binding.is_bound());
        assert_eq!(binding.detach_count(), 1);
    }
}
