//! GPU-side render state, keyed by `SessionId`.
//!
//! The session core never touches GPU objects directly. It asks a
//! `RenderStateStore` to create a slot when a session opens and to destroy
//! it when the session is destroyed, and nothing else.

use super::capabilities::Resettable;
use super::id::SessionId;
use bevy::prelude::*;
use std::collections::HashMap;

/// Owner of per-session GPU resources.
pub trait RenderStateStore {
    /// Allocate render state for a newly opened session.
    fn create(&mut self, id: SessionId);

    /// Free the render state of a destroyed session.
    fn destroy(&mut self, id: SessionId);
}

/// Per-session renderer data (chunk caches, selection overlays).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    /// Number of chunk meshes cached for this session.
    pub cached_chunks: usize,
    /// Set when the cache must be rebuilt before the next draw.
    pub needs_rebuild: bool,
}

/// Default in-memory `RenderStateStore`.
#[derive(Resource, Debug, Default)]
pub struct RenderStates {
    states: HashMap<SessionId, RenderState>,
    created_total: usize,
    destroyed_total: usize,
}

impl RenderStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SessionId) -> Option<&RenderState> {
        self.states.get(&id)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.states.contains_key(&id)
    }

    /// Number of live render states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Total creations since startup.
    pub fn created_total(&self) -> usize {
        self.created_total
    }

    /// Total destructions since startup.
    pub fn destroyed_total(&self) -> usize {
        self.destroyed_total
    }
}

impl RenderStateStore for RenderStates {
    fn create(&mut self, id: SessionId) {
        if self.states.contains_key(&id) {
            warn!("RenderStates: {} already has render state", id);
            return;
        }
        self.states.insert(
            id,
            RenderState {
                needs_rebuild: true,
                ..Default::default()
            },
        );
        self.created_total += 1;
        debug!("RenderStates: created {}", id);
    }

    fn destroy(&mut self, id: SessionId) {
        if self.states.remove(&id).is_some() {
            self.destroyed_total += 1;
            debug!("RenderStates: destroyed {}", id);
        } else {
            warn!("RenderStates: no render state for {}", id);
        }
    }
}

/// The shared tile renderer bound to the loaded client version.
#[derive(Resource, Debug, Default)]
pub struct MapRenderer {
    /// Sprite atlas pages uploaded to the GPU.
    pub atlas_pages: usize,
    loaded: bool,
}

impl MapRenderer {
    /// Mark the renderer as initialised with `atlas_pages` uploaded pages.
    pub fn initialize(&mut self, atlas_pages: usize) {
        self.atlas_pages = atlas_pages;
        self.loaded = true;
        info!("MapRenderer: initialized with {} atlas pages", atlas_pages);
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Drop the renderer and its atlas.
    pub fn release(&mut self) {
        if self.loaded {
            info!("MapRenderer: releasing {} atlas pages", self.atlas_pages);
        }
        self.atlas_pages = 0;
        self.loaded = false;
    }
}

impl Resettable for MapRenderer {
    fn reset(&mut self) {
        self.release();
    }
}
