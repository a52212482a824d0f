//! HTTP front-end for the nearby-places query.

mod handlers;
mod state;

pub use handlers::ApiError;
pub use state::AppState;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::Result;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/places", get(handlers::places))
        .route("/api/places/{id}", get(handlers::place_by_id))
        .route("/api/config", get(handlers::config))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, state: AppState) -> Result<()> {
    let app = build_router(Arc::new(state));
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Prox server listening on http://{}", addr);
    info!("Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => tracing::warn!("cannot listen for Ctrl+C: {}", e),
    }
}
