//! Geofence server.
//!
//! Resolves client addresses against a location dataset and evaluates the
//! configured geofencing rules over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geofence::config::Config;
use geofence::{GeoFilterSet, LocationRecord, LocationResolver};

#[derive(Parser, Debug)]
#[command(name = "geofence")]
#[command(about = "IP geolocation and geofencing server")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "geofence.toml")]
    config: PathBuf,

    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Override the dataset path from the config file
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Watch the dataset and reload it when it changes
    #[arg(long)]
    watch: bool,
}

/// Application state shared across handlers
struct AppState {
    resolver: LocationResolver,
    filters: GeoFilterSet,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Geofence Server");
    info!("Loading configuration from {}", args.config.display());

    let config = Config::load_from_file(&args.config)?;
    let dataset_path = args
        .dataset
        .unwrap_or_else(|| config.resolver.dataset_path.clone());
    let watch = args.watch || config.resolver.watch;

    let resolver: LocationResolver = LocationResolver::with_options(config.resolver.options());
    resolver
        .init(&dataset_path, watch)
        .with_context(|| format!("Failed to initialize resolver from {}", dataset_path.display()))?;

    info!("Loaded {} geofencing rules", config.filters.len());

    let state = Arc::new(AppState {
        resolver,
        filters: config.filters,
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/lookup", get(lookup_handler))
        .route("/v1/check", get(check_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.resolver.close();
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ready = state.resolver.is_ready();

    Json(HealthResponse {
        status: if ready { "ok" } else { "degraded" },
        resolver: ready,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    resolver: bool,
}

#[derive(Deserialize)]
struct AddressParams {
    /// Address to resolve
    ip: String,
}

/// Resolve an address to its location
async fn lookup_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AddressParams>,
) -> Result<Json<LocationRecord>, (StatusCode, String)> {
    state.resolver.lookup(&params.ip).map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("No location for address '{}'", params.ip),
        )
    })
}

/// Evaluate the configured rules for an address
async fn check_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AddressParams>,
) -> Json<CheckResponse> {
    let location = state.resolver.must_lookup(&params.ip);
    let allowed = state.filters.evaluate(&location);

    tracing::debug!(ip = %params.ip, allowed, "geofence check");

    Json(CheckResponse {
        allowed,
        location: location.is_valid().then_some(location),
    })
}

#[derive(Serialize)]
struct CheckResponse {
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<LocationRecord>,
}
