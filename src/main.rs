use chrono::Utc;
use clap::Parser;
use prox::analytics::{self, events, Analytics, TracingSink};
use prox::config::AppConfig;
use prox::notifications::{ConsoleNotificationCenter, EventNotificationsManager, HttpEventsProvider, LocationStateStore};
use prox::place::PlaceStore;
use prox::query::{self, NearbyQuery};
use prox::report::render_place_list;
use prox::server::{self, AppState};
use prox::{Coordinate, ProxError};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, warn};

/// Prox — places and events near you
///
/// Ranks places by distance and hides those that are closed or poorly rated.
///
/// Examples:
///   prox --lat 51.5046 --lon -0.0993
///   prox --lat 51.5046 --lon -0.0993 --at 2016-12-05T12:00 --tz Europe/London
///   prox --places london.json --lat 51.5046 --lon -0.0993 --descending --all
///   prox --lat 51.5046 --lon -0.0993 --notify
///   prox --serve --port 8080
#[derive(Parser)]
#[command(name = "prox", version, about, long_about = None)]
struct Cli {
    /// Places file (JSON array). Defaults to ~/.prox/places.json.
    #[arg(long, short = 'p')]
    places: Option<PathBuf>,

    /// Config file. Defaults to ~/.prox/config.json.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Latitude (-90 to 90).
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Farthest first.
    #[arg(long)]
    descending: bool,

    /// Query time: RFC 3339, or YYYY-MM-DDTHH:MM read in --tz. Defaults to now.
    #[arg(long)]
    at: Option<String>,

    /// IANA timezone for opening hours (e.g. Europe/London). Defaults to UTC.
    #[arg(long)]
    tz: Option<String>,

    /// Show every place, ignoring rating and opening-hours gates.
    #[arg(long)]
    all: bool,

    /// Record the location and check for nearby events to alert on.
    #[arg(long)]
    notify: bool,

    /// Event search radius in km (with --notify).
    #[arg(long, default_value_t = prox::notifications::provider::DEFAULT_RADIUS_KM)]
    radius: f64,

    /// Run the HTTP API instead of a one-shot query.
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[derive(Serialize)]
struct PlaceOutput<'a> {
    #[serde(flatten)]
    place: &'a prox::Place,
    distance_km: f64,
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    origin: Coordinate,
    at: String,
    count: usize,
    places: Vec<PlaceOutput<'a>>,
}

fn main() {
    prox::logging::init("info");
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ProxError> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    let store = match &cli.places {
        Some(path) => PlaceStore::load_from(path)?,
        None => PlaceStore::load()?,
    };

    let mut analytics = start_analytics(&config);

    if cli.serve {
        let state = AppState {
            store,
            config,
            analytics: Mutex::new(analytics),
        };
        let runtime = tokio::runtime::Runtime::new()?;
        return runtime.block_on(server::start(&cli.host, cli.port, state));
    }

    let origin = match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => query::parse_coordinate(lat, lon)?,
        _ => {
            eprintln!("Error: No location specified.");
            eprintln!();
            eprintln!("Usage:");
            eprintln!("  prox --lat 51.5046 --lon -0.0993");
            eprintln!("  prox --serve");
            std::process::exit(1);
        }
    };

    let tz = query::parse_tz(cli.tz.as_deref())?;
    let at = query::parse_at(cli.at.as_deref(), tz, Utc::now())?;

    let nearby = NearbyQuery {
        origin,
        at,
        thresholds: config.thresholds(),
        ascending: !cli.descending,
        include_all: cli.all,
    };
    let ranked = nearby.run(store.places());

    let name = if ranked.is_empty() { events::NO_PLACES_DIALOG } else { events::NEARBY_QUERY };
    analytics.log_event(name, &analytics::params([(events::NUM_CARDS, ranked.len())]));

    // Table to stderr
    eprint!("{}", render_place_list(&ranked, origin, &nearby.at));

    if cli.notify {
        notify(&config, origin, cli.radius);
    }

    // JSON to stdout
    let output = QueryOutput {
        origin,
        at: nearby.at.to_rfc3339(),
        count: ranked.len(),
        places: ranked
            .iter()
            .map(|r| PlaceOutput { place: r.place, distance_km: r.distance_km })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Analytics stay off when no keys file is present.
fn start_analytics(config: &AppConfig) -> Analytics {
    match Analytics::start_app_session(&config.api_keys_path, Box::new(TracingSink)) {
        Ok(a) => a,
        Err(e) => {
            warn!("analytics disabled: {}", e);
            Analytics::disabled()
        }
    }
}

/// The notification path only logs its failures.
fn notify(config: &AppConfig, origin: Coordinate, radius_km: f64) {
    if !config.notifications_enabled() {
        warn!("notifications are disabled on the {} channel", config.channel);
        return;
    }
    let Some(db_url) = config.database_url.clone() else {
        warn!("no 'database_url' configured; cannot look up events");
        return;
    };
    let root = match config.database_root() {
        Ok(root) => root,
        Err(e) => {
            warn!("{}", e);
            return;
        }
    };

    let provider = HttpEventsProvider::new(db_url, root).with_radius_km(radius_km);
    let mut manager = EventNotificationsManager::new(
        ConsoleNotificationCenter::new(),
        provider,
        LocationStateStore::load(),
        config.minimum_interval_at_location(),
    )
    .with_event_caching(config.cache_events());

    let now = Utc::now();
    if manager.update_location(origin, now, radius_km) {
        eprintln!("  New location recorded; events are checked once you stay put.");
    }

    match manager.send_event_notifications(origin, now) {
        Ok(None) => eprintln!("  Not at this location long enough to look for events."),
        Ok(Some(found)) => eprintln!(
            "  {} event(s) nearby, {} alert(s) shown.",
            found.len(),
            manager.center().delivered()
        ),
        Err(e) => warn!("event lookup failed: {}", e),
    }
}
