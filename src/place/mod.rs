//! Place data model: records, weekly opening hours and the on-disk store.

pub mod hours;
pub mod store;
pub mod types;

pub use hours::{OpenHours, OpenPeriod};
pub use store::PlaceStore;
pub use types::{Categories, Place, ReviewProvider};
