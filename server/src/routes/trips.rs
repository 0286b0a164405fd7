//! Single-trip endpoints: queries, lookups, create, delete and
//! association edits.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use trip_engine::{CreateOutcome, Trip, TripDraft, TripId, TripStore};

use crate::dto::{ChangedResponse, ListParams, NameRequest, SortParams, UsersResponse};
use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;

/// Create trip routes.
pub fn routes<S: TripStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/trips", get(list_trips::<S>).post(create_trip::<S>))
        .route("/trips/sort", get(sorted_trips::<S>))
        .route("/trips/name/{name}", get(trip_by_name::<S>))
        .route("/trips/{id}", get(get_trip::<S>).delete(remove_trip::<S>))
        .route("/trips/{id}/users", get(trip_users::<S>))
        .route("/trips/{id}/tags", post(add_tag::<S>))
        .route("/trips/{id}/tags/{name}", delete(remove_tag::<S>))
        .route("/trips/{id}/countries", post(add_country::<S>))
        .route("/trips/{id}/countries/{name}", delete(remove_country::<S>))
}

/// Query trips by criteria.
async fn list_trips<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Trip>>> {
    let criteria = params.into_criteria();
    tracing::debug!(?criteria, "GET /trips");

    let trips = state.service.query(&criteria).await?;
    tracing::info!("GET /trips returned {} trips", trips.len());
    Ok(Json(trips))
}

/// Every trip sorted by one attribute.
async fn sorted_trips<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiQuery(params): ApiQuery<SortParams>,
) -> Result<Json<Vec<Trip>>> {
    let trips = state
        .service
        .fetch_sorted_all(params.by, params.order)
        .await?;
    tracing::info!(
        "GET /trips/sort by {:?} {:?} returned {} trips",
        params.by,
        params.order,
        trips.len()
    );
    Ok(Json(trips))
}

async fn get_trip<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<TripId>,
) -> Result<Json<Trip>> {
    Ok(Json(state.service.fetch_one(id).await?))
}

async fn trip_by_name<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<Trip>> {
    Ok(Json(state.service.fetch_one_by_name(&name).await?))
}

/// Create a trip unless one with the same name exists.
///
/// Answers 201 with a `Location` header, or 409 with the stored trip and a
/// `Content-Location` header pointing at it.
async fn create_trip<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiJson(draft): ApiJson<TripDraft>,
) -> Result<Response> {
    tracing::info!("POST /trips invoked for '{}'", draft.name);

    let response = match state.service.create_one(draft).await? {
        CreateOutcome::Created(trip) => (
            StatusCode::CREATED,
            [(header::LOCATION, trip_location(trip.id))],
            Json(trip),
        )
            .into_response(),
        CreateOutcome::Existing(trip) => {
            tracing::info!("Returned CONFLICT for existing trip {}", trip.id);
            (
                StatusCode::CONFLICT,
                [(header::CONTENT_LOCATION, trip_location(trip.id))],
                Json(trip),
            )
                .into_response()
        }
    };

    Ok(response)
}

async fn remove_trip<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<TripId>,
) -> Result<StatusCode> {
    state.service.remove_one(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn trip_users<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<TripId>,
) -> Result<Json<UsersResponse>> {
    let users = state.service.users_of(id).await?;
    Ok(Json(UsersResponse { users }))
}

async fn add_tag<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<TripId>,
    ApiJson(request): ApiJson<NameRequest>,
) -> Result<Json<ChangedResponse>> {
    let changed = state.service.add_tag(id, &request.name).await?;
    Ok(Json(ChangedResponse { changed }))
}

async fn remove_tag<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiPath((id, name)): ApiPath<(TripId, String)>,
) -> Result<Json<ChangedResponse>> {
    let changed = state.service.remove_tag(id, &name).await?;
    Ok(Json(ChangedResponse { changed }))
}

async fn add_country<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<TripId>,
    ApiJson(request): ApiJson<NameRequest>,
) -> Result<Json<ChangedResponse>> {
    let changed = state.service.add_country(id, &request.name).await?;
    Ok(Json(ChangedResponse { changed }))
}

async fn remove_country<S: TripStore>(
    State(state): State<AppState<S>>,
    ApiPath((id, name)): ApiPath<(TripId, String)>,
) -> Result<Json<ChangedResponse>> {
    let changed = state.service.remove_country(id, &name).await?;
    Ok(Json(ChangedResponse { changed }))
}

pub(crate) fn trip_location(id: TripId) -> String {
    format!("/trips/{id}")
}
