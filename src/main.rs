mod api_docs;
mod config;
mod controllers;
mod error;
mod extract;
mod identity;
mod models;
mod routes;
mod services;
mod shared_state;
mod store;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{http::HeaderValue, response::Html, routing::get, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::api_docs::ApiDoc;
use crate::config::{Config, ServerConfig};
use crate::routes::api_routes::api_routes;
use crate::services::weather_service::OpenMeteoClient;
use crate::shared_state::AppState;
use crate::store::Store;

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if server.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Load configuration
    let config_path = std::env::var("SOLAR_CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let config = if Path::new(&config_path).exists() {
        match Config::load(&config_path) {
            Ok(c) => c,
            Err(e) => {
                error!(path = %config_path, error = %e, "failed to load configuration");
                return;
            }
        }
    } else {
        warn!(path = %config_path, "config file not found, using defaults");
        Config::default()
    };

    // 2. Restore stored records
    let store = match &config.storage.snapshot_path {
        Some(path) => match Store::load(Path::new(path)) {
            Ok(store) => {
                info!(
                    path = %path,
                    predictions = store.predictions.len(),
                    optimizations = store.optimizations.len(),
                    "snapshot loaded"
                );
                store
            }
            Err(e) => {
                error!(path = %path, error = %e, "failed to load snapshot");
                return;
            }
        },
        None => Store::default(),
    };

    // 3. Weather client and shared state
    let weather = match OpenMeteoClient::new(&config.weather) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "failed to build weather client");
            return;
        }
    };
    let state = AppState::new(store, weather, &config);

    // 4. HTTP server
    let app = Router::new()
        .nest("/api", api_routes(state))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("API server listening on http://{}", addr);
    info!("Scalar UI: http://{}/scalar", addr);

    if let Err(e) = axum_server::bind(addr).serve(app.into_make_service()).await {
        error!(error = %e, "server error");
    }
}
