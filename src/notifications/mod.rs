//! Nearby-event notification subsystem.
//!
//! Platform and backend specifics sit behind two traits:
//! [`NotificationCenter`] and [`EventsProvider`].

pub mod center;
pub mod manager;
pub mod provider;
pub mod state;
pub mod types;

pub use center::ConsoleNotificationCenter;
pub use manager::EventNotificationsManager;
pub use provider::HttpEventsProvider;
pub use state::LocationStateStore;
pub use types::{
    AuthorizationStatus, Event, EventsProvider, NotificationCategory, NotificationCenter, NotificationRequest,
};
