//! Build channel and remote-config constants.
//!
//! Read from ~/.prox/config.json. `PROX_CHANNEL` overrides the channel
//! recorded in the file. Missing file: all defaults.

use crate::error::{ProxError, Result};
use crate::utilities::VisibilityThresholds;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

pub const CHANNEL_ENV: &str = "PROX_CHANNEL";
pub const ONE_DAY: Duration = Duration::from_secs(60 * 60 * 24);
pub const API_KEYS_FILE: &str = "api_keys.json";
const PRODUCTION_ROOT: &str = "production/";

/// Root of all on-disk state.
pub fn prox_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".prox")
}

/// Distribution flavour of the running binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildChannel {
    #[default]
    Debug,
    CurrentLocation,
    MockLocation,
    Release,
}

impl FromStr for BuildChannel {
    type Err = ProxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "debug" => Ok(Self::Debug),
            "currentlocation" | "enterprise" => Ok(Self::CurrentLocation),
            "mocklocation" | "mock" => Ok(Self::MockLocation),
            "release" => Ok(Self::Release),
            _ => Err(ProxError::Config(format!(
                "Unknown channel '{}'. Use debug, current-location, mock-location or release.",
                s
            ))),
        }
    }
}

impl fmt::Display for BuildChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "Debug"),
            Self::CurrentLocation => write!(f, "CurrentLocation"),
            Self::MockLocation => write!(f, "MockLocation"),
            Self::Release => write!(f, "Release"),
        }
    }
}

/// Remotely tunable values and their fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteConfigKey {
    BackgroundFetchIntervalMins,
    NotificationVisitIntervalMins,
    CacheEvents,
    PlaceMinRating,
    PlaceMinReviewCount,
}

impl RemoteConfigKey {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BackgroundFetchIntervalMins => "background_fetch_interval_mins",
            Self::NotificationVisitIntervalMins => "notification_visit_interval_mins",
            Self::CacheEvents => "cache_events",
            Self::PlaceMinRating => "place_min_rating",
            Self::PlaceMinReviewCount => "place_min_review_count",
        }
    }

    pub fn default_value(&self) -> f64 {
        match self {
            Self::BackgroundFetchIntervalMins => 60.0,
            Self::NotificationVisitIntervalMins => 60.0,
            Self::CacheEvents => 0.0,
            Self::PlaceMinRating => f64::from(crate::utilities::DEFAULT_MIN_RATING),
            Self::PlaceMinReviewCount => f64::from(crate::utilities::DEFAULT_MIN_REVIEW_COUNT),
        }
    }
}

/// Remote-config snapshot. Unknown keys are kept but never read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteConfig {
    values: HashMap<String, f64>,
}

impl RemoteConfig {
    pub fn value(&self, key: RemoteConfigKey) -> f64 {
        self.values
            .get(key.name())
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or_else(|| key.default_value())
    }

    pub fn set(&mut self, key: RemoteConfigKey, value: f64) {
        self.values.insert(key.name().to_string(), value);
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    debug_root: Option<String>,
    #[serde(default)]
    database_url: Option<String>,
    #[serde(default)]
    remote: RemoteConfig,
}

/// Resolved application configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub channel: BuildChannel,
    /// Database root for Debug builds (without the trailing slash).
    pub debug_root: Option<String>,
    /// Base URL of the realtime database REST endpoint.
    pub database_url: Option<String>,
    pub remote: RemoteConfig,
    pub api_keys_path: PathBuf,
}

impl AppConfig {
    /// Load from the default location, honouring `PROX_CHANNEL`.
    pub fn load() -> Result<Self> {
        Self::load_from(&prox_dir().join("config.json"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_with_channel_override(path, std::env::var(CHANNEL_ENV).ok())
    }

    fn load_with_channel_override(path: &Path, channel_override: Option<String>) -> Result<Self> {
        let file = match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str::<ConfigFile>(&data)
                .map_err(|e| ProxError::Config(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                ConfigFile::default()
            }
            Err(e) => return Err(e.into()),
        };

        let channel = match channel_override.or(file.channel) {
            Some(raw) => raw.parse()?,
            None => BuildChannel::default(),
        };

        let api_keys_path = path
            .parent()
            .map(|p| p.join(API_KEYS_FILE))
            .unwrap_or_else(|| PathBuf::from(API_KEYS_FILE));

        Ok(Self {
            channel,
            debug_root: file.debug_root,
            database_url: file.database_url,
            remote: file.remote,
            api_keys_path,
        })
    }

    pub fn is_debug(&self) -> bool {
        self.channel == BuildChannel::Debug
    }

    pub fn is_enterprise(&self) -> bool {
        self.channel == BuildChannel::CurrentLocation
    }

    /// Location faking is only ever on in mock-location builds.
    pub fn location_faking(&self) -> bool {
        self.channel == BuildChannel::MockLocation
    }

    pub fn notifications_enabled(&self) -> bool {
        self.is_debug()
    }

    pub fn background_fetch_interval(&self) -> Duration {
        self.interval(RemoteConfigKey::BackgroundFetchIntervalMins)
    }

    /// How long the user must stay put before nearby events are fetched.
    pub fn minimum_interval_at_location(&self) -> Duration {
        self.interval(RemoteConfigKey::NotificationVisitIntervalMins)
    }

    fn interval(&self, key: RemoteConfigKey) -> Duration {
        if self.is_debug() {
            return Duration::from_secs(60);
        }
        let mins = self.remote.value(key);
        match Duration::try_from_secs_f64(mins * 60.0) {
            Ok(interval) => interval,
            Err(_) => {
                warn!(key = key.name(), mins, "interval out of range, using default");
                Duration::from_secs_f64(key.default_value() * 60.0)
            }
        }
    }

    pub fn cache_events(&self) -> bool {
        self.remote.value(RemoteConfigKey::CacheEvents) == 1.0
    }

    pub fn thresholds(&self) -> VisibilityThresholds {
        VisibilityThresholds {
            min_rating: self.remote.value(RemoteConfigKey::PlaceMinRating) as f32,
            min_review_count: self.remote.value(RemoteConfigKey::PlaceMinReviewCount).max(0.0) as u32,
        }
    }

    /// Root child in the realtime database for this channel.
    pub fn database_root(&self) -> Result<String> {
        match self.channel {
            BuildChannel::CurrentLocation | BuildChannel::MockLocation | BuildChannel::Release => {
                Ok(PRODUCTION_ROOT.to_string())
            }
            BuildChannel::Debug => self
                .debug_root
                .as_deref()
                .map(|root| format!("{}/", root.trim_end_matches('/')))
                .ok_or_else(|| ProxError::Config("Debug channel requires 'debug_root' in config".into())),
        }
    }
}
