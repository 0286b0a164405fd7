//! Health check endpoint.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use trip_engine::TripStore;

use crate::config::StoreBackend;
use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
}

/// Create health routes.
pub fn routes<S: TripStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/health", get(health_check::<S>))
        .route("/", get(root))
}

/// Health check handler.
async fn health_check<S: TripStore>(State(state): State<AppState<S>>) -> Json<HealthResponse> {
    let store = match state.config.store {
        StoreBackend::Postgres => "postgres",
        StoreBackend::Memory => "memory",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store.to_string(),
    })
}

/// Root handler.
async fn root() -> &'static str {
    "Trips Server"
}
