//! Ordered collection of open sessions (tabs).
//!
//! The registry owns every live `EditorSession`, allocates session ids and
//! tracks the active tab. The active index is either `None` or a valid index
//! into the session list, and is forced to `None` whenever the list empties.
//!
//! Two ways out of the registry exist:
//! - `close_tab` destroys immediately. Only call it where nothing in the
//!   current frame can still reference the session (menu actions, hotkeys).
//! - `extract_session` / `extract_all_sessions` hand ownership to the caller
//!   without destroying anything. These are reserved for the
//!   `LifecycleCoordinator` and the version switch.

use super::capabilities::DocumentSaver;
use super::editor_session::{Document, EditorSession, ModifiedHook};
use super::id::{SessionId, SessionIdGenerator};
use super::render_state::RenderStateStore;
use bevy::prelude::*;
use std::path::PathBuf;

/// Observer of active-tab changes.
///
/// `old` is `None` when there was no active tab, and also after a close or
/// extraction, meaning "do not persist view state for the old tab, it may be
/// gone".
pub trait TabListener: Send + Sync {
    fn on_tab_changed(&mut self, old: Option<usize>, new: Option<usize>);
}

/// Result of `SessionRegistry::save_modified`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub saved: Vec<SessionId>,
    pub failed: Vec<SessionId>,
}

impl SaveReport {
    pub fn all_saved(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Open sessions in user-visible tab order.
#[derive(Resource, Default)]
pub struct SessionRegistry {
    sessions: Vec<EditorSession>,
    active: Option<usize>,
    ids: SessionIdGenerator,
    undo_limit: usize,
    modified_hook: Option<ModifiedHook>,
    listeners: Vec<Box<dyn TabListener>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry allocating session ids from `ids`.
    pub fn with_ids(ids: SessionIdGenerator) -> Self {
        Self {
            ids,
            ..Default::default()
        }
    }

    /// Keep at most `undo_limit` undo entries in sessions opened from now on.
    pub fn with_undo_limit(mut self, undo_limit: usize) -> Self {
        self.undo_limit = undo_limit;
        self
    }

    /// Register a tab-changed observer.
    pub fn add_listener(&mut self, listener: Box<dyn TabListener>) {
        self.listeners.push(listener);
    }

    /// Hook installed into every session opened from now on.
    pub fn set_modified_hook(&mut self, hook: ModifiedHook) {
        self.modified_hook = Some(hook);
    }

    /// Open `document` as a new tab and make it active.
    ///
    /// Allocates a fresh `SessionId` and asks `store` to create its render
    /// state. Returns the new tab index.
    pub fn open_session(
        &mut self,
        document: Box<dyn Document>,
        path: Option<PathBuf>,
        store: &mut dyn RenderStateStore,
    ) -> usize {
        let id = self.ids.allocate();
        store.create(id);

        let mut session = EditorSession::new(id, document, path, self.undo_limit);
        session.set_modified_hook(self.modified_hook.clone());
        info!("SessionRegistry: opened {} ({})", id, session.display_name());

        self.sessions.push(session);
        let index = self.sessions.len() - 1;
        self.set_active_tab(index);
        index
    }

    /// Close a tab and destroy its session and render state right away.
    ///
    /// Must not be called while the tab strip is being drawn; use
    /// `LifecycleCoordinator::request_close_tab` there. Out-of-range indices
    /// are ignored.
    pub fn close_tab(&mut self, index: usize, store: &mut dyn RenderStateStore) {
        let Some(session) = self.take(index) else {
            return;
        };
        let id = session.id();
        drop(session);
        store.destroy(id);
        info!("SessionRegistry: closed tab {} ({})", index, id);
        self.notify(None, self.active);
    }

    /// Remove a session without destroying it.
    pub(crate) fn extract_session(&mut self, index: usize) -> Option<EditorSession> {
        let Some(session) = self.take(index) else {
            warn!("SessionRegistry: extract_session - invalid index {}", index);
            return None;
        };
        self.notify(None, self.active);
        Some(session)
    }

    /// Remove every session without destroying any of them.
    pub(crate) fn extract_all_sessions(&mut self) -> Vec<EditorSession> {
        let old = self.active.take();
        let extracted = std::mem::take(&mut self.sessions);
        self.notify(old, None);
        extracted
    }

    /// Switch to `index`. Out-of-range indices and re-selecting the active tab are no-ops.
    pub fn set_active_tab(&mut self, index: usize) {
        if index >= self.sessions.len() || self.active == Some(index) {
            return;
        }
        let old = self.active.replace(index);
        self.notify(old, Some(index));
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_session(&self) -> Option<&EditorSession> {
        self.active.and_then(|i| self.sessions.get(i))
    }

    pub fn active_session_mut(&mut self) -> Option<&mut EditorSession> {
        self.active.and_then(|i| self.sessions.get_mut(i))
    }

    pub fn session(&self, index: usize) -> Option<&EditorSession> {
        self.sessions.get(index)
    }

    pub fn session_mut(&mut self, index: usize) -> Option<&mut EditorSession> {
        self.sessions.get_mut(index)
    }

    pub fn session_by_id(&self, id: SessionId) -> Option<&EditorSession> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    /// Index of the tab holding `id`.
    pub fn index_of(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id() == id)
    }

    pub fn tab_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditorSession> {
        self.sessions.iter()
    }

    /// True if any open session has unsaved edits.
    pub fn has_unsaved_changes(&self) -> bool {
        self.sessions.iter().any(EditorSession::is_modified)
    }

    /// Save every modified session through `saver`.
    ///
    /// A session is marked clean and remembers its path only when its save
    /// succeeds. Failed sessions stay modified and are listed in the report.
    pub fn save_modified(&mut self, saver: &mut dyn DocumentSaver) -> SaveReport {
        let mut report = SaveReport::default();
        for session in self.sessions.iter_mut().filter(|s| s.is_modified()) {
            match saver.save(session) {
                Ok(path) => {
                    info!("SessionRegistry: saved {} to {:?}", session.id(), path);
                    session.set_file_path(path);
                    session.set_modified(false);
                    report.saved.push(session.id());
                }
                Err(e) => {
                    warn!("SessionRegistry: failed to save {}: {}", session.id(), e);
                    report.failed.push(session.id());
                }
            }
        }
        report
    }

    /// Remove the session at `index`, applying the active-index rule.
    fn take(&mut self, index: usize) -> Option<EditorSession> {
        if index >= self.sessions.len() {
            return None;
        }
        let next_active = Self::active_after_removal(self.sessions.len(), self.active, index);
        let session = self.sessions.remove(index);
        self.active = next_active;
        Some(session)
    }

    /// Where the active tab lands after removing `index` from `len` tabs.
    fn active_after_removal(len: usize, active: Option<usize>, index: usize) -> Option<usize> {
        if len == 1 {
            return None;
        }
        match active {
            Some(a) if a == index => Some(index.saturating_sub(1)),
            Some(a) if index < a => Some(a - 1),
            other => other,
        }
    }

    fn notify(&mut self, old: Option<usize>, new: Option<usize>) {
        for listener in &mut self.listeners {
            listener.on_tab_changed(old, new);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::capabilities::SaveError;
    use crate::session::editor_session::tests::TestDoc;
    use crate::session::render_state::RenderStates;
    use std::sync::{Arc, Mutex};

    type Changes = Arc<Mutex<Vec<(Option<usize>, Option<usize>)>>>;

    struct Recorder(Changes);

    impl TabListener for Recorder {
        fn on_tab_changed(&mut self, old: Option<usize>, new: Option<usize>) {
            self.0.lock().unwrap().push((old, new));
        }
    }

    fn registry_with(n: usize, store: &mut RenderStates) -> SessionRegistry {
        let mut registry = SessionRegistry::new();
        for _ in 0..n {
            registry.open_session(Box::new(TestDoc("map")), None, &mut *store);
        }
        registry
    }

    #[test]
    fn test_open_activates_new_tab() {
        let mut store = RenderStates::new();
        let mut registry = SessionRegistry::new();
        for expected in 0..4 {
            let index = registry.open_session(Box::new(TestDoc("map")), None, &mut store);
            assert_eq!(index, expected);
            assert_eq!(registry.active_index(), Some(expected));
        }
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_open_allocates_increasing_ids() {
        let mut store = RenderStates::new();
        let registry = registry_with(2, &mut store);
        assert_eq!(registry.session(0).unwrap().id().get(), 1);
        assert_eq!(registry.session(1).unwrap().id().get(), 2);
    }

    #[test]
    fn test_close_active_moves_to_previous() {
        let mut store = RenderStates::new();
        let mut registry = registry_with(3, &mut store);
        registry.set_active_tab(1);
        registry.close_tab(1, &mut store);
        assert_eq!(registry.active_index(), Some(0));
        assert_eq!(registry.tab_count(), 2);
    }

    #[test]
    fn test_close_active_first_stays_at_zero() {
        let mut store = RenderStates::new();
        let mut registry = registry_with(3, &mut store);
        registry.set_active_tab(0);
        registry.close_tab(0, &mut store);
        assert_eq!(registry.active_index(), Some(0));
    }

    #[test]
    fn test_close_last_active_tab() {
        let mut store = RenderStates::new();
        let mut registry = registry_with(3, &mut store);
        assert_eq!(registry.active_index(), Some(2));
        registry.close_tab(2, &mut store);
        assert_eq!(registry.active_index(), Some(1));
        assert_eq!(registry.tab_count(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_close_before_active_shifts_down() {
        let mut store = RenderStates::new();
        let mut registry = registry_with(4, &mut store);
        registry.set_active_tab(2);
        registry.close_tab(0, &mut store);
        assert_eq!(registry.active_index(), Some(1));
    }

    #[test]
    fn test_close_after_active_unchanged() {
        let mut store = RenderStates::new();
        let mut registry = registry_with(4, &mut store);
        registry.set_active_tab(1);
        registry.close_tab(3, &mut store);
        assert_eq!(registry.active_index(), Some(1));
    }

    #[test]
    fn test_close_only_tab_clears_active() {
        let mut store = RenderStates::new();
        let mut registry = registry_with(1, &mut store);
        registry.close_tab(0, &mut store);
        assert_eq!(registry.active_index(), None);
        assert!(registry.active_session().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_close_out_of_range_is_noop() {
        let mut store = RenderStates::new();
        let mut registry = registry_with(2, &mut store);
        registry.close_tab(7, &mut store);
        assert_eq!(registry.tab_count(), 2);
        assert_eq!(store.destroyed_total(), 0);
    }

    #[test]
    fn test_close_reports_unknown_old_index() {
        let mut store = RenderStates::new();
        let changes = Changes::default();
        let mut registry = SessionRegistry::new();
        registry.add_listener(Box::new(Recorder(changes.clone())));
        registry.open_session(Box::new(TestDoc("a")), None, &mut store);
        registry.open_session(Box::new(TestDoc("b")), None, &mut store);
        registry.close_tab(1, &mut store);

        assert_eq!(
            *changes.lock().unwrap(),
            vec![(None, Some(0)), (Some(0), Some(1)), (None, Some(0))]
        );
    }

    #[test]
    fn test_extract_does_not_destroy() {
        let mut store = RenderStates::new();
        let mut registry = registry_with(2, &mut store);
        let session = registry.extract_session(0).unwrap();
        assert_eq!(session.id().get(), 1);
        assert_eq!(registry.tab_count(), 1);
        assert_eq!(registry.active_index(), Some(0));
        assert!(store.contains(session.id()));
    }

    #[test]
    fn test_extract_invalid_index() {
        let mut store = RenderStates::new();
        let mut registry = registry_with(1, &mut store);
        assert!(registry.extract_session(3).is_none());
        assert_eq!(registry.tab_count(), 1);
    }

    #[test]
    fn test_extract_all() {
        let mut store = RenderStates::new();
        let changes = Changes::default();
        let mut registry = registry_with(3, &mut store);
        registry.add_listener(Box::new(Recorder(changes.clone())));

        let sessions = registry.extract_all_sessions();
        assert_eq!(sessions.len(), 3);
        assert!(registry.is_empty());
        assert_eq!(registry.active_index(), None);
        assert_eq!(store.len(), 3);
        assert_eq!(*changes.lock().unwrap(), vec![(Some(2), None)]);
    }

    #[test]
    fn test_set_active_out_of_range() {
        let mut store = RenderStates::new();
        let mut registry = registry_with(2, &mut store);
        registry.set_active_tab(5);
        assert_eq!(registry.active_index(), Some(1));
        assert!(registry.session(5).is_none());
    }

    /// Saver that records which sessions it was asked to write and fails
    /// for the ids in `reject`.
    struct RecordingSaver {
        saved: Vec<SessionId>,
        reject: Vec<SessionId>,
    }

    impl DocumentSaver for RecordingSaver {
        fn save(&mut self, session: &EditorSession) -> Result<PathBuf, SaveError> {
            if self.reject.contains(&session.id()) {
                return Err("disk full".into());
            }
            self.saved.push(session.id());
            Ok(PathBuf::from(format!("maps/{}.json", session.id().get())))
        }
    }

    #[test]
    fn test_unsaved_changes() {
        let mut store = RenderStates::new();
        let mut registry = registry_with(2, &mut store);
        assert!(!registry.has_unsaved_changes());
        registry.session_mut(0).unwrap().record("paint");
        assert!(registry.has_unsaved_changes());

        let mut saver = RecordingSaver {
            saved: Vec::new(),
            reject: Vec::new(),
        };
        let report = registry.save_modified(&mut saver);
        assert!(report.all_saved());
        assert!(!registry.has_unsaved_changes());
    }

    #[test]
    fn test_save_modified_skips_clean_and_keeps_failures_modified() {
        let mut store = RenderStates::new();
        let mut registry = registry_with(3, &mut store);
        registry.session_mut(0).unwrap().record("paint");
        registry.session_mut(2).unwrap().record("fill");
        let failing = registry.session(2).unwrap().id();

        let mut saver = RecordingSaver {
            saved: Vec::new(),
            reject: vec![failing],
        };
        let report = registry.save_modified(&mut saver);

        let first = registry.session(0).unwrap();
        assert_eq!(saver.saved, vec![first.id()]);
        assert_eq!(report.saved, vec![first.id()]);
        assert_eq!(report.failed, vec![failing]);
        assert!(!first.is_modified());
        assert_eq!(first.file_path(), Some(std::path::Path::new("maps/1.json")));
        assert!(registry.session(2).unwrap().is_modified());
        assert!(registry.has_unsaved_changes());
    }

    #[test]
    fn test_injected_id_generator() {
        let mut store = RenderStates::new();
        let mut registry =
            SessionRegistry::with_ids(SessionIdGenerator::starting_at(100)).with_undo_limit(3);
        registry.open_session(Box::new(TestDoc("a")), None, &mut store);
        registry.open_session(Box::new(TestDoc("b")), None, &mut store);
        assert_eq!(registry.session(0).unwrap().id().get(), 100);
        assert_eq!(registry.session(1).unwrap().id().get(), 101);
        assert!(store.contains(registry.session(1).unwrap().id()));
    }

    #[test]
    fn test_modified_hook_installed_on_open() {
        let mut store = RenderStates::new();
        let hits = Arc::new(Mutex::new(0));
        let sink = hits.clone();
        let mut registry = SessionRegistry::new();
        registry.set_modified_hook(Arc::new(move |_: SessionId, _: bool| *sink.lock().unwrap() += 1));
        registry.open_session(Box::new(TestDoc("a")), None, &mut store);
        registry.active_session_mut().unwrap().set_modified(true);
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_index_of() {
        let mut store = RenderStates::new();
        let registry = registry_with(3, &mut store);
        let id = registry.session(2).unwrap().id();
        assert_eq!(registry.index_of(id), Some(2));
        assert_eq!(registry.session_by_id(id).map(EditorSession::id), Some(id));
    }
}
