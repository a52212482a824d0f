//! A "what's nearby right now" request, shared by the CLI and the HTTP API.

use crate::error::{ProxError, Result};
use crate::geo::Coordinate;
use crate::place::Place;
use crate::utilities::{self, RankedPlace, VisibilityThresholds};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub struct NearbyQuery {
    pub origin: Coordinate,
    pub at: DateTime<Tz>,
    pub thresholds: VisibilityThresholds,
    pub ascending: bool,
    /// Skip both visibility gates.
    pub include_all: bool,
}

impl NearbyQuery {
    pub fn run<'a>(&self, places: &'a [Place]) -> Vec<RankedPlace<'a>> {
        if self.include_all {
            utilities::rank(places, self.origin, self.ascending)
        } else {
            utilities::nearby(places, self.origin, &self.at, &self.thresholds, self.ascending)
        }
    }
}

pub fn parse_coordinate(lat: f64, lon: f64) -> Result<Coordinate> {
    Coordinate::try_new(lat, lon)
        .ok_or_else(|| ProxError::InvalidInput("Invalid coordinates. Lat: -90..90, Lon: -180..180".into()))
}

pub fn parse_tz(raw: Option<&str>) -> Result<Tz> {
    match raw {
        Some(name) => name
            .parse()
            .map_err(|_| ProxError::InvalidInput(format!("Unknown timezone '{}'. Use IANA format (e.g. Europe/London).", name))),
        None => Ok(chrono_tz::UTC),
    }
}

/// Resolve the query instant.
///
/// RFC 3339 input keeps its own instant; a naive "YYYY-MM-DDTHH:MM[:SS]" is
/// read as wall time in `tz`. No input means now.
pub fn parse_at(raw: Option<&str>, tz: Tz, now: DateTime<Utc>) -> Result<DateTime<Tz>> {
    let Some(raw) = raw else {
        return Ok(now.with_timezone(&tz));
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&tz));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .map_err(|e| ProxError::InvalidInput(format!("Invalid time '{}': {}", raw, e)))?;

    // Wall times skipped by a DST jump have no instant; ambiguous ones take the earlier.
    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| ProxError::InvalidInput(format!("Time '{}' does not exist in {}", raw, tz)))
}
