use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::analytics::{self, events};
use crate::error::ProxError;
use crate::geo::{format_coords, Coordinate};
use crate::place::Place;
use crate::query::{self, NearbyQuery};
use crate::utilities::VisibilityThresholds;

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(rejection.status(), rejection.body_text())
    }
}

impl From<ProxError> for ApiError {
    fn from(e: ProxError) -> Self {
        let status = match e {
            ProxError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ProxError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, e.to_string())
    }
}

// ─── GET /api/places ─────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct PlacesQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// "asc" (default) or "desc".
    pub order: Option<String>,
    pub at: Option<String>,
    pub tz: Option<String>,
    #[serde(default)]
    pub all: bool,
}

#[derive(Serialize, Debug)]
pub struct PlaceView {
    #[serde(flatten)]
    pub place: Place,
    pub distance_km: f64,
}

#[derive(Serialize, Debug)]
pub struct PlacesResponse {
    pub origin: Coordinate,
    pub formatted_origin: String,
    pub at: String,
    pub thresholds: VisibilityThresholds,
    pub count: usize,
    pub places: Vec<PlaceView>,
}

pub async fn places(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PlacesQuery>, QueryRejection>,
) -> Result<Json<PlacesResponse>, ApiError> {
    let start = Instant::now();
    let Query(params) = params?;

    let (lat, lon) = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return Err(ApiError(StatusCode::BAD_REQUEST, "Provide 'lat' and 'lon' parameters".into())),
    };
    let origin = query::parse_coordinate(lat, lon)?;
    let ascending = parse_order(params.order.as_deref())?;
    let tz = query::parse_tz(params.tz.as_deref())?;
    let at = query::parse_at(params.at.as_deref(), tz, Utc::now())?;

    let nearby = NearbyQuery {
        origin,
        at,
        thresholds: state.config.thresholds(),
        ascending,
        include_all: params.all,
    };

    let places: Vec<PlaceView> = nearby
        .run(state.store.places())
        .into_iter()
        .map(|r| PlaceView { place: r.place.clone(), distance_km: r.distance_km })
        .collect();

    if let Ok(mut analytics) = state.analytics.lock() {
        let name = if places.is_empty() { events::NO_PLACES_DIALOG } else { events::NEARBY_QUERY };
        analytics.log_event(name, &analytics::params([(events::NUM_CARDS, places.len())]));
    }

    info!(
        "GET /api/places lat={} lon={} -> {} places ({:.1}ms)",
        lat,
        lon,
        places.len(),
        start.elapsed().as_secs_f64() * 1000.0,
    );

    Ok(Json(PlacesResponse {
        origin,
        formatted_origin: format_coords(origin),
        at: nearby.at.to_rfc3339(),
        thresholds: nearby.thresholds,
        count: places.len(),
        places,
    }))
}

// ─── GET /api/places/{id} ────────────────────────────────────────

pub async fn place_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Place>, ApiError> {
    state
        .store
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ProxError::NotFound(id).into())
}

// ─── GET /api/config ─────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct ConfigResponse {
    pub channel: String,
    pub is_debug: bool,
    pub is_enterprise: bool,
    pub location_faking: bool,
    pub notifications_enabled: bool,
    pub background_fetch_interval_secs: u64,
    pub minimum_interval_at_location_secs: u64,
    pub cache_events: bool,
    pub thresholds: VisibilityThresholds,
    pub place_count: usize,
}

pub async fn config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let cfg = &state.config;
    Json(ConfigResponse {
        channel: cfg.channel.to_string(),
        is_debug: cfg.is_debug(),
        is_enterprise: cfg.is_enterprise(),
        location_faking: cfg.location_faking(),
        notifications_enabled: cfg.notifications_enabled(),
        background_fetch_interval_secs: cfg.background_fetch_interval().as_secs(),
        minimum_interval_at_location_secs: cfg.minimum_interval_at_location().as_secs(),
        cache_events: cfg.cache_events(),
        thresholds: cfg.thresholds(),
        place_count: state.store.len(),
    })
}

// ─── Helpers ─────────────────────────────────────────────────────

fn parse_order(s: Option<&str>) -> Result<bool, ApiError> {
    match s {
        None | Some("asc") | Some("ascending") => Ok(true),
        Some("desc") | Some("descending") => Ok(false),
        Some(other) => Err(ApiError(
            StatusCode::BAD_REQUEST,
            format!("Unknown order '{}'. Use 'asc' or 'desc'.", other),
        )),
    }
}
