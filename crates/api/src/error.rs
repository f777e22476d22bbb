//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::ShipmentError;
use repository::RepositoryError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Command pipeline error.
    Repository(RepositoryError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Repository(err) => repository_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn repository_error_to_response(err: RepositoryError) -> (StatusCode, String) {
    match &err {
        RepositoryError::Domain(domain_err) => match domain_err {
            ShipmentError::InvalidTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
            ShipmentError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            ShipmentError::NotImplemented { .. } => {
                (StatusCode::NOT_IMPLEMENTED, err.to_string())
            }
            ShipmentError::EmptyHistory | ShipmentError::MalformedHistory => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        },
        RepositoryError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        _ => {
            tracing::error!(error = %err, "command pipeline error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Repository(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::ShipmentStatus;

    #[test]
    fn guard_rejections_map_to_conflict() {
        let err = ApiError::Repository(RepositoryError::Domain(
            ShipmentError::InvalidTransition {
                from: ShipmentStatus::Pending,
                to: ShipmentStatus::Delivered,
            },
        ));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_shipments_map_to_not_found() {
        let err = ApiError::Repository(RepositoryError::NotFound {
            shipment_id: common::ShipmentId::new(),
        });
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ApiError::Repository(RepositoryError::Domain(ShipmentError::Validation(
            "no items".to_string(),
        )));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unimplemented_exchange_policy_maps_to_not_implemented() {
        let err = ApiError::Repository(RepositoryError::Domain(ShipmentError::NotImplemented {
            condition: domain::ProductCondition::Damaged,
        }));
        assert_eq!(err.into_response().status(), StatusCode::NOT_IMPLEMENTED);
    }
}
