//! Prox: nearby places and events.
//!
//! The heart of the crate is [`utilities`]: distance ranking plus the
//! rating and opening-hours gates that decide which places a user sees.
//! Around it sit the place model, channel configuration, an analytics front,
//! nearby-event notifications, and CLI/HTTP front-ends.

pub mod analytics;
pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod notifications;
pub mod place;
pub mod query;
pub mod report;
pub mod server;
pub mod utilities;
pub mod widgets;

pub use error::{ProxError, Result};
pub use geo::Coordinate;
pub use place::{OpenHours, OpenPeriod, Place, ReviewProvider};
