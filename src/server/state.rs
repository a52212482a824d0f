use crate::analytics::Analytics;
use crate::config::AppConfig;
use crate::place::PlaceStore;
use std::sync::Mutex;

pub struct AppState {
    pub store: PlaceStore,
    pub config: AppConfig,
    pub analytics: Mutex<Analytics>,
}
