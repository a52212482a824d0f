//! Usage analytics over a pluggable vendor sink.
//!
//! The sink is whatever SDK binding the host provides; [`TracingSink`] is the
//! in-tree default and only writes log records.

use crate::error::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

pub type Params = Map<String, Value>;

/// Key under which the vendor API key is stored in the keys file.
pub const API_KEY_NAME: &str = "FLURRY";
pub const SESSION_CONTINUE_SECS: u64 = 30;
pub const DURATION_PARAM: &str = "duration_ms";

/// Event and parameter names.
pub mod events {
    pub const SESSION_SUFFIX: &str = "_session_duration";
    pub const DETAILS_CARD_SESSION_DURATION: &str = "details_card_session_duration";

    // Place details
    pub const YELP: &str = "yelp_link";
    pub const YELP_TOGGLE: &str = "yelp_review_toggle";
    pub const YELP_READ: &str = "yelp_read_more";

    pub const TRIPADVISOR: &str = "tripadvisor_link";
    pub const TRIPADVISOR_TOGGLE: &str = "tripadvisor_review_toggle";
    pub const TRIPADVISOR_READ: &str = "tripadvisor_read_more";

    pub const WIKIPEDIA_TOGGLE: &str = "wikipedia_toggle";
    pub const WIKIPEDIA_READ: &str = "wikipedia_read_more";

    pub const DIRECTIONS: &str = "directions_link";
    pub const WEBSITE: &str = "website_link";
    /// Return to the carousel.
    pub const MAP_BUTTON: &str = "map_button";

    // Params
    pub const PARAM_ACTION: &str = "action";
    pub const NUM_CARDS: &str = "num_cards";
    pub const CARD_INDEX: &str = "card_index";
    pub const SESSION_STATE: &str = "session_state";

    // Events
    pub const EVENT_BANNER_LINK: &str = "event_banner_link";
    pub const EVENT_NOTIFICATION: &str = "event_notification";
    /// Notified while in the background.
    pub const BACKGROUND: &str = "notified_background";
    /// Notified while open.
    pub const FOREGROUND: &str = "notified_foreground";
    pub const CLICKED: &str = "notification_clicked";
    pub const NO_PLACES_DIALOG: &str = "no_places_dialog";
    /// Re-prompt for users who denied the location permission.
    pub const LOCATION_REPROMPT: &str = "location_reprompt";
    pub const NEARBY_QUERY: &str = "nearby_query";
}

/// Vendor SDK seam.
pub trait AnalyticsSink: Send {
    fn start_session(&mut self, api_key: &str, continue_secs: u64);
    fn log_event(&mut self, name: &str, params: &Params, timed: bool);
    fn end_timed_event(&mut self, name: &str, params: &Params);
}

/// Sink that only emits `tracing` records.
#[derive(Debug, Default)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn start_session(&mut self, _api_key: &str, continue_secs: u64) {
        info!(continue_secs, "analytics session started");
    }

    fn log_event(&mut self, name: &str, params: &Params, timed: bool) {
        let params = Value::Object(params.clone());
        info!(event = name, timed, params = %params, "analytics event");
    }

    fn end_timed_event(&mut self, name: &str, params: &Params) {
        let params = Value::Object(params.clone());
        info!(event = name, params = %params, "analytics timed event ended");
    }
}

/// The analytics front. Disabled instances swallow every call.
pub struct Analytics {
    sink: Option<Box<dyn AnalyticsSink>>,
    open_sessions: HashMap<String, Instant>,
}

impl Analytics {
    /// Read the API key and start a vendor session.
    ///
    /// A missing keys file is an error; a keys file without the vendor key
    /// yields a disabled instance.
    pub fn start_app_session(keys_path: &Path, mut sink: Box<dyn AnalyticsSink>) -> Result<Self> {
        let data = fs::read_to_string(keys_path)?;
        let keys: HashMap<String, String> = serde_json::from_str(&data)?;

        let Some(key) = keys.get(API_KEY_NAME) else {
            warn!("No {} key! Not collecting analytics.", API_KEY_NAME);
            return Ok(Self::disabled());
        };

        sink.start_session(key, SESSION_CONTINUE_SECS);
        Ok(Self { sink: Some(sink), open_sessions: HashMap::new() })
    }

    pub fn disabled() -> Self {
        Self { sink: None, open_sessions: HashMap::new() }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn log_event(&mut self, event: &str, params: &Params) {
        debug!("Analytics event: {}", event);
        if let Some(sink) = self.sink.as_mut() {
            sink.log_event(event, params, false);
        }
    }

    /// Start a timed event.
    pub fn start_session(&mut self, session_name: &str, params: &Params) {
        let Some(sink) = self.sink.as_mut() else { return };
        sink.log_event(session_name, params, true);
        self.open_sessions.insert(session_name.to_string(), Instant::now());
    }

    /// End a timed event; adds the elapsed time when the start was seen.
    pub fn end_session(&mut self, session_name: &str, params: &Params) {
        let Some(sink) = self.sink.as_mut() else { return };
        let mut params = params.clone();
        match self.open_sessions.remove(session_name) {
            Some(started) => {
                params.insert(DURATION_PARAM.into(), Value::from(started.elapsed().as_millis() as u64));
            }
            None => warn!(session = session_name, "ending a session that was never started"),
        }
        sink.end_timed_event(session_name, &params);
    }
}

impl Default for Analytics {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Build a params map from string pairs.
pub fn params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}
