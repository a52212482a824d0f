//! Core types for nearby-event notifications.

use crate::error::Result;
use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

pub const CATEGORY_EVENTS: &str = "EVENTS";
pub const ACTION_OPEN: &str = "OPEN_ACTION";
pub const REQUEST_IDENTIFIER: &str = "EventNotification";
pub const PLACE_ID_KEY: &str = "eventPlaceID";

/// An event happening at a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub place_id: String,
    pub description: String,
    pub coordinates: Coordinate,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Whether the user allowed alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthorizationStatus {
    NotDetermined,
    Denied,
    Authorized,
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDetermined => write!(f, "NotDetermined"),
            Self::Denied => write!(f, "Denied"),
            Self::Authorized => write!(f, "Authorized"),
        }
    }
}

/// An action button shown on a notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationAction {
    pub identifier: String,
    pub title: String,
    pub foreground: bool,
}

/// Notification category registered with the center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationCategory {
    pub identifier: String,
    pub actions: Vec<NotificationAction>,
    pub custom_dismiss_action: bool,
}

impl NotificationCategory {
    /// The category used for nearby-event alerts: a single "Open" action.
    pub fn events() -> Self {
        Self {
            identifier: CATEGORY_EVENTS.into(),
            actions: vec![NotificationAction {
                identifier: ACTION_OPEN.into(),
                title: "Open".into(),
                foreground: true,
            }],
            custom_dismiss_action: true,
        }
    }
}

/// A local notification to be delivered after `delay`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRequest {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub category: String,
    pub delay: Duration,
    pub user_info: BTreeMap<String, String>,
}

impl NotificationRequest {
    pub fn for_event(event: &Event) -> Self {
        let mut user_info = BTreeMap::new();
        user_info.insert(PLACE_ID_KEY.to_string(), event.place_id.clone());
        Self {
            identifier: REQUEST_IDENTIFIER.into(),
            title: "New event!".into(),
            body: format!("Event Body {}", event),
            category: CATEGORY_EVENTS.into(),
            delay: Duration::from_secs(1),
            user_info,
        }
    }
}

/// Platform notification seam.
pub trait NotificationCenter {
    fn set_categories(&mut self, categories: Vec<NotificationCategory>);
    fn authorization_status(&self) -> AuthorizationStatus;
    /// Ask the user; returns whether access was granted.
    fn request_authorization(&mut self) -> Result<bool>;
    fn schedule(&mut self, request: NotificationRequest) -> Result<()>;
}

/// Source of events near a location.
pub trait EventsProvider {
    fn events_for_notifications(&self, location: Coordinate) -> Result<Vec<Event>>;
}
