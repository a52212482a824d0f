//! Nearby-event alerts: decides when to look for events and turns each found
//! event into a local notification.

use super::state::LocationStateStore;
use super::types::{
    AuthorizationStatus, Event, EventsProvider, NotificationCategory, NotificationCenter, NotificationRequest,
};
use crate::error::Result;
use crate::geo::{self, Coordinate};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct EventNotificationsManager<C: NotificationCenter, P: EventsProvider> {
    center: C,
    provider: P,
    state: LocationStateStore,
    min_interval_at_location: Duration,
    cache_events: bool,
}

impl<C: NotificationCenter, P: EventsProvider> EventNotificationsManager<C, P> {
    /// Registers the events category and asks for permission if needed.
    pub fn new(center: C, provider: P, state: LocationStateStore, min_interval_at_location: Duration) -> Self {
        let mut manager = Self {
            center,
            provider,
            state,
            min_interval_at_location,
            cache_events: false,
        };
        manager.request_notifications();
        manager
    }

    /// Keep the last fetched events in the state file.
    pub fn with_event_caching(mut self, cache_events: bool) -> Self {
        self.cache_events = cache_events;
        self
    }

    fn request_notifications(&mut self) {
        self.center.set_categories(vec![NotificationCategory::events()]);
        if self.center.authorization_status() == AuthorizationStatus::Authorized {
            return;
        }
        match self.center.request_authorization() {
            Ok(granted) => info!(granted, "notification authorization requested"),
            Err(e) => warn!("notification authorization failed: {}", e),
        }
    }

    pub fn center(&self) -> &C {
        &self.center
    }

    pub fn state(&self) -> &LocationStateStore {
        &self.state
    }

    /// Remember when the user arrived at their current location.
    pub fn record_location_update(&mut self, at: DateTime<Utc>) {
        self.state.set_time_of_last_location_update(at);
    }

    /// Note a location fix. The stay timer restarts when there is no saved
    /// fix or the user is more than `radius_km` from it; returns true then.
    pub fn update_location(&mut self, location: Coordinate, now: DateTime<Utc>, radius_km: f64) -> bool {
        let moved = match (self.state.last_location(), self.state.time_of_last_location_update()) {
            (Some(saved), Some(_)) => geo::distance_km(saved, location) > radius_km,
            _ => true,
        };
        if moved {
            debug!(lat = location.lat, lon = location.lon, "location changed, restarting stay timer");
            self.state.set_location_update(now, location);
        }
        moved
    }

    fn event_fetch_start_time(&self) -> Option<DateTime<Utc>> {
        let last = self.state.time_of_last_location_update()?;
        let interval = chrono::Duration::from_std(self.min_interval_at_location).ok()?;
        last.checked_add_signed(interval)
    }

    /// True once the user has stayed put for the minimum interval.
    pub fn should_fetch_events(&self, now: DateTime<Utc>) -> bool {
        match self.event_fetch_start_time() {
            Some(start) => start < now,
            None => false,
        }
    }

    /// Fetch events near `location` and alert on each.
    ///
    /// `Ok(None)` when fetching is not due yet; otherwise the fetched events.
    pub fn send_event_notifications(&mut self, location: Coordinate, now: DateTime<Utc>) -> Result<Option<Vec<Event>>> {
        if !self.should_fetch_events(now) {
            debug!("Should not fetch events");
            return Ok(None);
        }
        debug!("Should fetch events & send notifications");

        let events = self.provider.events_for_notifications(location)?;
        if events.is_empty() {
            info!("Found no events");
        } else {
            info!(count = events.len(), "Found events");
            self.send_notifications(&events);
        }

        if self.cache_events {
            self.state.set_cached_events(events.clone());
        }
        Ok(Some(events))
    }

    fn send_notifications(&mut self, events: &[Event]) {
        for event in events {
            info!("Sending notification for event {}", event);
            let status = self.center.authorization_status();
            if status != AuthorizationStatus::Authorized {
                warn!("Settings not authorized for notifications {}", status);
                continue;
            }
            match self.center.schedule(NotificationRequest::for_event(event)) {
                Ok(()) => debug!("Notification scheduled"),
                Err(e) => warn!("{}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProxError;
    use crate::notifications::types::PLACE_ID_KEY;
    use chrono::TimeZone;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct FakeCenter {
        status: AuthorizationStatus,
        grant: bool,
        auth_requests: usize,
        categories: Vec<NotificationCategory>,
        scheduled: Vec<NotificationRequest>,
        fail_schedule: bool,
    }

    impl FakeCenter {
        fn with_status(status: AuthorizationStatus) -> Self {
            Self {
                status,
                grant: false,
                auth_requests: 0,
                categories: vec![],
                scheduled: vec![],
                fail_schedule: false,
            }
        }
    }

    impl NotificationCenter for FakeCenter {
        fn set_categories(&mut self, categories: Vec<NotificationCategory>) {
            self.categories = categories;
        }
        fn authorization_status(&self) -> AuthorizationStatus {
            self.status
        }
        fn request_authorization(&mut self) -> Result<bool> {
            self.auth_requests += 1;
            if self.grant {
                self.status = AuthorizationStatus::Authorized;
            }
            Ok(self.grant)
        }
        fn schedule(&mut self, request: NotificationRequest) -> Result<()> {
            if self.fail_schedule {
                return Err(ProxError::InvalidInput("center rejected request".into()));
            }
            self.scheduled.push(request);
            Ok(())
        }
    }

    struct FakeProvider {
        events: Vec<Event>,
        calls: Cell<usize>,
        fail: bool,
    }

    impl FakeProvider {
        fn with_events(events: Vec<Event>) -> Self {
            Self { events, calls: Cell::new(0), fail: false }
        }
    }

    impl EventsProvider for FakeProvider {
        fn events_for_notifications(&self, _location: Coordinate) -> Result<Vec<Event>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ProxError::Network("offline".into()));
            }
            Ok(self.events.clone())
        }
    }

    fn event(id: &str, place: &str) -> Event {
        Event {
            id: id.into(),
            place_id: place.into(),
            description: format!("event {}", id),
            coordinates: Coordinate::new(51.5, -0.1),
            start_time: None,
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 12, 5, 12, 0, 0).unwrap()
    }

    fn here() -> Coordinate {
        Coordinate::new(51.5046323, -0.0992547)
    }

    fn manager(
        center: FakeCenter,
        provider: FakeProvider,
    ) -> (EventNotificationsManager<FakeCenter, FakeProvider>, TempDir) {
        let dir = TempDir::new().unwrap();
        let state = LocationStateStore::load_from(dir.path().join("state.json"));
        let m = EventNotificationsManager::new(center, provider, state, Duration::from_secs(60));
        (m, dir)
    }

    #[test]
    fn test_requests_authorization_when_not_authorized() {
        let mut center = FakeCenter::with_status(AuthorizationStatus::NotDetermined);
        center.grant = true;
        let (m, _dir) = manager(center, FakeProvider::with_events(vec![]));
        assert_eq!(m.center().auth_requests, 1);
        assert_eq!(m.center().status, AuthorizationStatus::Authorized);
        assert_eq!(m.center().categories, vec![NotificationCategory::events()]);
    }

    #[test]
    fn test_no_request_when_already_authorized() {
        let (m, _dir) = manager(
            FakeCenter::with_status(AuthorizationStatus::Authorized),
            FakeProvider::with_events(vec![]),
        );
        assert_eq!(m.center().auth_requests, 0);
    }

    #[test]
    fn test_not_due_without_location_update() {
        let (mut m, _dir) = manager(
            FakeCenter::with_status(AuthorizationStatus::Authorized),
            FakeProvider::with_events(vec![event("e1", "p1")]),
        );
        assert!(!m.should_fetch_events(noon()));
        assert_eq!(m.send_event_notifications(here(), noon()).unwrap(), None);
        assert_eq!(m.provider.calls.get(), 0);
    }

    #[test]
    fn test_due_only_after_interval() {
        let (mut m, _dir) = manager(
            FakeCenter::with_status(AuthorizationStatus::Authorized),
            FakeProvider::with_events(vec![]),
        );
        m.record_location_update(noon());
        assert!(!m.should_fetch_events(noon()));
        assert!(!m.should_fetch_events(noon() + chrono::Duration::seconds(60)));
        assert!(m.should_fetch_events(noon() + chrono::Duration::seconds(61)));
    }

    #[test]
    fn test_moving_away_restarts_stay_timer() {
        let (mut m, _dir) = manager(
            FakeCenter::with_status(AuthorizationStatus::Authorized),
            FakeProvider::with_events(vec![event("e1", "p1")]),
        );
        assert!(m.update_location(here(), noon(), 1.0));

        let later = noon() + chrono::Duration::minutes(5);
        let paris = Coordinate::new(48.8566, 2.3522);
        assert!(m.update_location(paris, later, 1.0));
        assert!(!m.should_fetch_events(later));
        assert_eq!(m.send_event_notifications(paris, later).unwrap(), None);
        assert_eq!(m.state().last_location(), Some(paris));
        assert_eq!(m.state().time_of_last_location_update(), Some(later));
    }

    #[test]
    fn test_staying_put_keeps_stay_timer() {
        let (mut m, _dir) = manager(
            FakeCenter::with_status(AuthorizationStatus::Authorized),
            FakeProvider::with_events(vec![event("e1", "p1")]),
        );
        assert!(m.update_location(here(), noon(), 1.0));

        // ~200 m up the road
        let nearby = Coordinate::new(51.5064, -0.0993);
        let later = noon() + chrono::Duration::minutes(5);
        assert!(!m.update_location(nearby, later, 1.0));
        assert_eq!(m.state().time_of_last_location_update(), Some(noon()));
        assert_eq!(m.send_event_notifications(nearby, later).unwrap().map(|e| e.len()), Some(1));
    }

    #[test]
    fn test_schedules_one_notification_per_event() {
        let (mut m, _dir) = manager(
            FakeCenter::with_status(AuthorizationStatus::Authorized),
            FakeProvider::with_events(vec![event("e1", "p1"), event("e2", "p2")]),
        );
        m.record_location_update(noon());

        let later = noon() + chrono::Duration::minutes(5);
        let events = m.send_event_notifications(here(), later).unwrap().unwrap();
        assert_eq!(events.len(), 2);

        let scheduled = &m.center().scheduled;
        assert_eq!(scheduled.len(), 2);
        assert_eq!(scheduled[0].title, "New event!");
        assert_eq!(scheduled[0].body, "Event Body event e1");
        assert_eq!(scheduled[0].category, "EVENTS");
        assert_eq!(scheduled[0].delay, Duration::from_secs(1));
        assert_eq!(scheduled[1].user_info[PLACE_ID_KEY], "p2");
        // nothing cached unless asked
        assert!(m.state().cached_events().is_empty());
    }

    #[test]
    fn test_unauthorized_schedules_nothing_but_returns_events() {
        let (mut m, _dir) = manager(
            FakeCenter::with_status(AuthorizationStatus::Denied),
            FakeProvider::with_events(vec![event("e1", "p1")]),
        );
        m.record_location_update(noon());
        let events = m.send_event_notifications(here(), noon() + chrono::Duration::hours(1)).unwrap();
        assert_eq!(events.map(|e| e.len()), Some(1));
        assert!(m.center().scheduled.is_empty());
    }

    #[test]
    fn test_schedule_failure_is_logged_and_skipped() {
        let mut center = FakeCenter::with_status(AuthorizationStatus::Authorized);
        center.fail_schedule = true;
        let (mut m, _dir) = manager(center, FakeProvider::with_events(vec![event("e1", "p1"), event("e2", "p2")]));
        m.record_location_update(noon());
        let events = m.send_event_notifications(here(), noon() + chrono::Duration::hours(1)).unwrap();
        assert_eq!(events.unwrap().len(), 2);
    }

    #[test]
    fn test_provider_error_propagates() {
        let mut provider = FakeProvider::with_events(vec![]);
        provider.fail = true;
        let (mut m, _dir) = manager(FakeCenter::with_status(AuthorizationStatus::Authorized), provider);
        m.record_location_update(noon());
        assert!(m.send_event_notifications(here(), noon() + chrono::Duration::hours(1)).is_err());
    }

    #[test]
    fn test_event_caching() {
        let dir = TempDir::new().unwrap();
        let state = LocationStateStore::load_from(dir.path().join("state.json"));
        let mut m = EventNotificationsManager::new(
            FakeCenter::with_status(AuthorizationStatus::Authorized),
            FakeProvider::with_events(vec![event("e1", "p1")]),
            state,
            Duration::from_secs(60),
        )
        .with_event_caching(true);
        m.record_location_update(noon());
        m.send_event_notifications(here(), noon() + chrono::Duration::hours(1)).unwrap();

        let reloaded = LocationStateStore::load_from(dir.path().join("state.json"));
        assert_eq!(reloaded.cached_events().len(), 1);
        assert_eq!(reloaded.time_of_last_location_update(), Some(noon()));
    }
}
