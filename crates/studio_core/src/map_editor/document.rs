//! Map document held by an editor session.
//!
//! A single floor of tile ids, row-major. The session core treats it as an
//! opaque `Document`; the editor shell downcasts to `MapDocument`.

use crate::session::Document;
use serde::{Deserialize, Serialize};
use std::any::Any;

/// A 2D grid of tile ids. Id 0 means "empty".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    name: String,
    /// Width of the map in tiles.
    pub width: usize,
    /// Height of the map in tiles.
    pub height: usize,
    /// Client version the map was created against.
    pub client_version: u32,
    /// Flat array of tile ids (row-major order).
    pub tiles: Vec<u32>,
}

impl MapDocument {
    /// Create an empty map.
    pub fn new(name: impl Into<String>, width: usize, height: usize, client_version: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            client_version,
            tiles: vec![0; width * height],
        }
    }

    /// Set the tile at (x, y). Does nothing if out of bounds.
    pub fn set(&mut self, x: usize, y: usize, tile: u32) {
        if x < self.width && y < self.height {
            self.tiles[y * self.width + x] = tile;
        }
    }

    /// Tile at (x, y), or 0 if out of bounds.
    pub fn get(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.tiles[y * self.width + x]
        } else {
            0
        }
    }

    /// True if `tiles` holds exactly `width * height` entries.
    pub fn is_consistent(&self) -> bool {
        self.tiles.len() == self.width * self.height
    }

    /// Number of non-empty tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.iter().filter(|&&t| t != 0).count()
    }
}

impl Document for MapDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
