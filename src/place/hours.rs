//! Weekly opening hours.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One open/close pair within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPeriod {
    #[serde(with = "hhmm")]
    pub open: NaiveTime,
    #[serde(with = "hhmm")]
    pub close: NaiveTime,
}

impl OpenPeriod {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    /// Convenience constructor from hour/minute pairs. Returns None for
    /// out-of-range components.
    pub fn from_hm(open_hour: u32, open_min: u32, close_hour: u32, close_min: u32) -> Option<Self> {
        Some(Self {
            open: NaiveTime::from_hms_opt(open_hour, open_min, 0)?,
            close: NaiveTime::from_hms_opt(close_hour, close_min, 0)?,
        })
    }

    /// Half-open membership: `open <= t < close`.
    /// A period whose close is not after its open runs to midnight.
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.close > self.open {
            self.open <= t && t < self.close
        } else {
            t >= self.open
        }
    }
}

/// Per-weekday list of open periods. A weekday missing from the map has no
/// listed hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpenHours {
    pub hours: HashMap<Weekday, Vec<OpenPeriod>>,
}

impl OpenHours {
    pub fn new(hours: HashMap<Weekday, Vec<OpenPeriod>>) -> Self {
        let mut hours = hours;
        for periods in hours.values_mut() {
            periods.sort_by_key(|p| p.open);
        }
        Self { hours }
    }

    /// Builder-style insert used by tests and fixtures.
    pub fn with_day(mut self, day: Weekday, periods: Vec<OpenPeriod>) -> Self {
        let mut periods = periods;
        periods.sort_by_key(|p| p.open);
        self.hours.insert(day, periods);
        self
    }

    pub fn periods(&self, day: Weekday) -> &[OpenPeriod] {
        self.hours.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    /// True when `t` falls inside any period listed for `day`.
    pub fn is_open_at(&self, day: Weekday, t: NaiveTime) -> bool {
        self.periods(day).iter().any(|p| p.contains(t))
    }
}

/// Time-of-day as "HH:MM"; "HH:MM:SS" is accepted on input.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
            .map_err(|e| serde::de::Error::custom(format!("invalid time '{}': {}", raw, e)))
    }
}
