//! Great-circle geometry on a spherical Earth.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const DEG: f64 = PI / 180.0;

/// IUGG mean Earth radius.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Checked constructor for user input.
    pub fn try_new(lat: f64, lon: f64) -> Option<Self> {
        if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
            Some(Self { lat, lon })
        } else {
            None
        }
    }

    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        distance_km(*self, *other)
    }
}

/// Haversine distance between two coordinates.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat * DEG;
    let phi2 = b.lat * DEG;
    let d_phi = (b.lat - a.lat) * DEG;
    let d_lambda = (b.lon - a.lon) * DEG;

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h just past 1.0 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// Human-readable distance: metres below one kilometre, otherwise km.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0} m", km * 1000.0)
    } else {
        format!("{:.1} km", km)
    }
}

/// Format coordinates as e.g. "51.5046°N, 0.0993°W".
pub fn format_coords(c: Coordinate) -> String {
    let ns = if c.lat >= 0.0 { 'N' } else { 'S' };
    let ew = if c.lon >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", c.lat.abs(), ns, c.lon.abs(), ew)
}
