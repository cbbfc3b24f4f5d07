//! Document loads requested mid-frame.
//!
//! Open dialogs and drag-and-drop fire while the UI is being drawn. The
//! loaded document is parked here and opened as a session after the
//! lifecycle coordinator's per-frame step, which also moves the app into
//! the Editor state.

use super::app_state::{AppState, AppStateMachine};
use super::editor_session::Document;
use super::registry::SessionRegistry;
use super::render_state::RenderStateStore;
use bevy::prelude::*;
use std::path::PathBuf;

struct LoadRequest {
    document: Box<dyn Document>,
    path: Option<PathBuf>,
}

#[derive(Resource, Default)]
pub struct DocumentLoadQueue {
    pending: Vec<LoadRequest>,
}

impl DocumentLoadQueue {
    /// Park a loaded document until the end of the frame.
    pub fn request(&mut self, document: Box<dyn Document>, path: Option<PathBuf>) {
        debug!("DocumentLoadQueue: queued {}", document.name());
        self.pending.push(LoadRequest { document, path });
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Open every parked document, in request order. Returns the new tab
    /// indices.
    pub fn process(
        &mut self,
        registry: &mut SessionRegistry,
        store: &mut dyn RenderStateStore,
        state: &mut AppStateMachine,
    ) -> Vec<usize> {
        let opened: Vec<usize> = self
            .pending
            .drain(..)
            .map(|request| registry.open_session(request.document, request.path, &mut *store))
            .collect();

        if !opened.is_empty() {
            state.transition(AppState::Editor);
        }
        opened
    }
}
