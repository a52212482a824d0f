//! Events from the realtime database REST endpoint.

use super::types::{Event, EventsProvider};
use crate::error::{ProxError, Result};
use crate::geo::{self, Coordinate};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_RADIUS_KM: f64 = 1.0;
const USER_AGENT: &str = "Prox/0.3";

#[derive(Deserialize, Debug)]
struct RemoteEvent {
    place_id: String,
    description: String,
    coordinates: Coordinate,
    #[serde(default)]
    start_time: Option<DateTime<Utc>>,
}

/// Fetches `<base_url>/<root>events.json` and keeps events within
/// `radius_km` of the query location.
pub struct HttpEventsProvider {
    base_url: String,
    root: String,
    radius_km: f64,
    timeout: Duration,
}

impl HttpEventsProvider {
    pub fn new(base_url: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            root: root.into(),
            radius_km: DEFAULT_RADIUS_KM,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    pub fn url(&self) -> String {
        format!("{}/{}events.json", self.base_url.trim_end_matches('/'), self.root)
    }
}

impl EventsProvider for HttpEventsProvider {
    fn events_for_notifications(&self, location: Coordinate) -> Result<Vec<Event>> {
        let url = self.url();
        debug!(%url, "fetching events");

        let response = ureq::get(&url)
            .set("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .call()
            .map_err(|e| ProxError::Network(e.to_string()))?;

        // An empty database node comes back as `null`.
        let body: Option<HashMap<String, serde_json::Value>> = response
            .into_json()
            .map_err(|e| ProxError::InvalidResponse(e.to_string()))?;

        Ok(events_near(body.unwrap_or_default(), location, self.radius_km))
    }
}

/// Decode raw event nodes, skipping malformed ones, and keep those in range.
fn events_near(nodes: HashMap<String, serde_json::Value>, location: Coordinate, radius_km: f64) -> Vec<Event> {
    let mut events: Vec<Event> = nodes
        .into_iter()
        .filter_map(|(id, node)| match serde_json::from_value::<RemoteEvent>(node) {
            Ok(raw) => Some(Event {
                id,
                place_id: raw.place_id,
                description: raw.description,
                coordinates: raw.coordinates,
                start_time: raw.start_time,
            }),
            Err(e) => {
                warn!(event = %id, "skipping malformed event: {}", e);
                None
            }
        })
        .filter(|e| geo::distance_km(location, e.coordinates) <= radius_km)
        .collect();
    events.sort_by(|a, b| a.id.cmp(&b.id));
    events
}
