//! HTTP route definitions.

mod bulk;
mod health;
mod trips;

use crate::AppState;
use axum::Router;
use trip_engine::TripStore;

/// Create all application routes.
pub fn create_routes<S: TripStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .merge(health::routes())
        .merge(trips::routes())
        .merge(bulk::routes())
}
