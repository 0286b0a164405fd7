//! Trips Server - HTTP backend for managing trips.
//!
//! Exposes trip queries, single-trip CRUD and bulk reconciliation over
//! JSON, delegating all business rules to trip-engine. Persistence is
//! PostgreSQL by default, or an in-memory store for local runs.

mod config;
mod db;
mod dto;
mod error;
mod extract;
mod routes;

use crate::config::{Config, ConfigError, StoreBackend};
use crate::db::PgStore;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trip_engine::{MemoryStore, TripService, TripStore};

/// Application state shared across handlers.
pub struct AppState<S> {
    pub service: Arc<TripService<S>>,
    pub config: Arc<Config>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: TripStore> AppState<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self {
            service: Arc::new(TripService::new(store)),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "trip_server=debug,trip_engine=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Trips Server on {}:{}", config.host, config.port);

    match config.store {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .clone()
                .ok_or(ConfigError::MissingDatabaseUrl)?;
            let pool = db::create_pool(&database_url, config.max_connections).await?;

            tracing::info!("Running database migrations...");
            db::run_migrations(&pool).await?;

            let store = PgStore::new(pool).with_atomic_replace(config.atomic_replace);
            serve(store, config).await
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; trips are lost on shutdown");
            serve(MemoryStore::new(), config).await
        }
    }
}

async fn serve<S: TripStore + 'static>(
    store: S,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.host, config.port);
    let app = app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn app<S: TripStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
