//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Engine error: {0}")]
    Engine(#[from] trip_engine::Error),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            AppError::Engine(e) => engine_status(e),
            AppError::BadRequest(msg) => {
                tracing::info!("Returned BAD_REQUEST: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}

fn engine_status(error: &trip_engine::Error) -> (StatusCode, String, Option<String>) {
    use trip_engine::Error;

    match error {
        Error::NotFound(_) => {
            tracing::info!("Returned NOT_FOUND: {}", error);
            (StatusCode::NOT_FOUND, error.to_string(), None)
        }
        Error::InvalidCriterion { .. } | Error::InconsistentRange { .. } => {
            tracing::info!("Returned UNPROCESSABLE_ENTITY: {}", error);
            (StatusCode::UNPROCESSABLE_ENTITY, error.to_string(), None)
        }
        Error::Store(source) => {
            tracing::error!("Store error: {:?}", source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Store error".to_string(),
                Some(source.to_string()),
            )
        }
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use trip_engine::{CriterionValue, Error, TripKey};

    #[test]
    fn engine_errors_map_to_statuses() {
        let status = |err: Error| AppError::from(err).into_response().status();

        assert_eq!(
            status(Error::NotFound(TripKey::Id(1))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(Error::InvalidCriterion {
                field: "minPrice",
                value: CriterionValue::Int(-1),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(Error::InconsistentRange {
                lower_field: "minPrice",
                lower_value: CriterionValue::Int(2),
                upper_field: "maxPrice",
                upper_value: CriterionValue::Int(1),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(Error::store(sqlx::Error::PoolClosed)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn bad_request() {
        let response = AppError::BadRequest("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
