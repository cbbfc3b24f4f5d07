//! Client-version-bound resources.
//!
//! Item definitions and sprites come from one version of the game client.
//! Everything loaded from it lives in `ClientVersionManager`; other systems
//! may keep cheap `Arc` clones in a `ClientDataCache`, which must be cleared
//! whenever the manager releases its data.

use super::capabilities::Resettable;
use bevy::prelude::*;
use std::sync::Arc;

/// Data loaded from one client version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientData {
    /// Client version number (e.g. 860, 1098).
    pub version: u32,
    /// Number of item types loaded.
    pub item_count: usize,
    /// Number of sprites loaded.
    pub sprite_count: usize,
}

impl ClientData {
    pub fn new(version: u32, item_count: usize, sprite_count: usize) -> Self {
        Self {
            version,
            item_count,
            sprite_count,
        }
    }
}

/// Owner of the loaded client data.
#[derive(Resource, Debug, Default)]
pub struct ClientVersionManager {
    client: Option<Arc<ClientData>>,
}

impl ClientVersionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of freshly loaded client data.
    pub fn set_client_data(&mut self, data: ClientData) -> Arc<ClientData> {
        info!("ClientVersionManager: client data set (version {})", data.version);
        let data = Arc::new(data);
        self.client = Some(data.clone());
        data
    }

    pub fn client_data(&self) -> Option<&Arc<ClientData>> {
        self.client.as_ref()
    }

    pub fn has_client_data(&self) -> bool {
        self.client.is_some()
    }

    /// Loaded client version, if any.
    pub fn version(&self) -> Option<u32> {
        self.client.as_ref().map(|c| c.version)
    }

    /// Drop everything loaded from the current client version.
    pub fn release_all(&mut self) {
        info!("ClientVersionManager: releasing all resources");
        self.client = None;
    }
}

impl Resettable for ClientVersionManager {
    fn reset(&mut self) {
        self.release_all();
    }
}

/// Client data references cached by map operations so the next map of the
/// same version can open without reloading.
#[derive(Resource, Debug, Default)]
pub struct ClientDataCache {
    existing: Option<Arc<ClientData>>,
}

impl ClientDataCache {
    pub fn set(&mut self, data: Arc<ClientData>) {
        self.existing = Some(data);
    }

    pub fn get(&self) -> Option<&Arc<ClientData>> {
        self.existing.as_ref()
    }

    /// Reusable only when the cached data matches `version`.
    pub fn reusable_for(&self, version: u32) -> Option<Arc<ClientData>> {
        self.existing.as_ref().filter(|c| c.version == version).cloned()
    }
}

impl Resettable for ClientDataCache {
    fn reset(&mut self) {
        self.existing = None;
    }
}
