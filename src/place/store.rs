//! File-backed place set at ~/.prox/places.json.
//!
//! The file holds a JSON array of places, one snapshot per data fetch.

use super::types::Place;
use crate::error::{ProxError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An in-memory snapshot of places loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct PlaceStore {
    path: Option<PathBuf>,
    places: Vec<Place>,
}

impl PlaceStore {
    /// Load from the default location (~/.prox/places.json).
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load from a specific path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        let places: Vec<Place> = serde_json::from_str(&data)?;
        debug!(path = %path.display(), count = places.len(), "loaded places");
        Ok(Self { path: Some(path.to_path_buf()), places })
    }

    /// Wrap an already fetched set.
    pub fn from_places(places: Vec<Place>) -> Self {
        Self { path: None, places }
    }

    pub fn default_path() -> PathBuf {
        crate::config::prox_dir().join("places.json")
    }

    /// Write the snapshot back to where it was loaded from.
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| ProxError::InvalidInput("place store has no backing file".into()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.places)?)?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}
