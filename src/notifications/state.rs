//! File-based notification state at ~/.prox/state.json.
//!
//! Holds the time and coordinate of the last location update and, when event
//! caching is on, the last fetched events. Missing or unreadable state starts empty.

use super::types::Event;
use crate::geo::Coordinate;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

pub const TIME_OF_LAST_LOCATION_UPDATE_KEY: &str = "timeOfLastLocationUpdate";

#[derive(Serialize, Deserialize, Default, Clone)]
struct StateFile {
    /// Milliseconds since the Unix epoch.
    #[serde(default, rename = "timeOfLastLocationUpdate")]
    last_location_update: Option<i64>,
    #[serde(default, rename = "lastLocation")]
    last_location: Option<Coordinate>,
    #[serde(default)]
    cached_events: Vec<Event>,
}

/// Persistent notification state.
pub struct LocationStateStore {
    path: PathBuf,
    state: StateFile,
}

impl LocationStateStore {
    /// Load from the default location (~/.prox/state.json).
    pub fn load() -> Self {
        Self::load_from(crate::config::prox_dir().join("state.json"))
    }

    /// Load from a specific path (for testing).
    pub fn load_from(path: PathBuf) -> Self {
        let state = Self::read_file(&path).unwrap_or_default();
        Self { path, state }
    }

    fn read_file(path: &PathBuf) -> Option<StateFile> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data)
            .map_err(|e| warn!(path = %path.display(), "ignoring unreadable state: {}", e))
            .ok()
    }

    pub fn time_of_last_location_update(&self) -> Option<DateTime<Utc>> {
        self.state
            .last_location_update
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    pub fn set_time_of_last_location_update(&mut self, at: DateTime<Utc>) {
        self.state.last_location_update = Some(at.timestamp_millis());
        self.persist();
    }

    /// Where the user was when the last update was recorded.
    pub fn last_location(&self) -> Option<Coordinate> {
        self.state.last_location
    }

    /// Record arrival at `location`, writing time and place together.
    pub fn set_location_update(&mut self, at: DateTime<Utc>, location: Coordinate) {
        self.state.last_location_update = Some(at.timestamp_millis());
        self.state.last_location = Some(location);
        self.persist();
    }

    pub fn cached_events(&self) -> &[Event] {
        &self.state.cached_events
    }

    pub fn set_cached_events(&mut self, events: Vec<Event>) {
        self.state.cached_events = events;
        self.persist();
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("cannot create {}: {}", parent.display(), e);
                return;
            }
        }
        match serde_json::to_string_pretty(&self.state) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    warn!("cannot write {}: {}", self.path.display(), e);
                }
            }
            Err(e) => warn!("cannot encode state: {}", e),
        }
    }
}
