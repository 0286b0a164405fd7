//! Collection-level endpoints under `/trips/bulk`.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use trip_engine::{BulkReport, Trip, TripDraft, TripStore};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::AppState;

const COLLECTION: &str = "/trips";

/// Create bulk routes.
pub fn routes<S: TripStore + 'static>() -> Router<AppState<S>> {
    Router::new().route(
        "/trips/bulk",
        get(fetch_all::<S>)
            .post(append::<S>)
            .put(replace::<S>)
            .patch(upsert::<S>)
            .delete(remove_all::<S>),
    )
}

async fn fetch_all<S: TripStore>(State(state): State<AppState<S>>) -> Result<Json<Vec<Trip>>> {
    Ok(Json(state.service.fetch_all().await?))
}

/// Insert every draft whose name is free.
async fn append<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiJson(drafts): ApiJson<Vec<TripDraft>>,
) -> Result<Response> {
    tracing::info!("POST /trips/bulk invoked with {} trips", drafts.len());
    let report = state.service.append_many(drafts).await?;
    Ok(report_response(report))
}

/// Swap the whole collection, unless the batch repeats a name.
async fn replace<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiJson(drafts): ApiJson<Vec<TripDraft>>,
) -> Result<Response> {
    tracing::info!("PUT /trips/bulk invoked with {} trips", drafts.len());
    let report = state.service.replace_all(drafts).await?;
    Ok(report_response(report))
}

async fn upsert<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiJson(drafts): ApiJson<Vec<TripDraft>>,
) -> Result<Json<Vec<Trip>>> {
    tracing::info!("PATCH /trips/bulk invoked with {} trips", drafts.len());
    Ok(Json(state.service.upsert_many(drafts).await?))
}

async fn remove_all<S: TripStore>(State(state): State<AppState<S>>) -> Result<StatusCode> {
    tracing::info!("DELETE /trips/bulk invoked");
    state.service.remove_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 201 with the inserted trips, or 409 with the conflicting ones.
fn report_response<C: Serialize>(report: BulkReport<C>) -> Response {
    if report.has_conflicts() {
        tracing::info!(
            "Returned CONFLICT with {} conflicting trips",
            report.conflicts.len()
        );
        (
            StatusCode::CONFLICT,
            [(header::CONTENT_LOCATION, COLLECTION)],
            Json(report.conflicts),
        )
            .into_response()
    } else {
        (
            StatusCode::CREATED,
            [(header::LOCATION, COLLECTION)],
            Json(report.inserted),
        )
            .into_response()
    }
}
