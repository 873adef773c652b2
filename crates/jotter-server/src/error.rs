use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use jotter_auth::AuthError;
use jotter_store::StoreError;

/// Request-level error taxonomy.  Every variant maps to exactly one HTTP
/// status; all errors are recovered at the request boundary and none are
/// fatal to the process.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed, missing, or oversized input -- 400.
    #[error("{0}")]
    Validation(String),

    /// Missing/invalid/expired token or bad credentials -- 401.
    #[error("{0}")]
    Authentication(String),

    /// Resource absent, or owned by someone else -- 404 either way, so the
    /// existence of other users' data never leaks.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation -- 409.
    #[error("{0}")]
    Conflict(String),

    /// Anything unexpected -- 500 with a generic message.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Authentication(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            ApiError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Not found".to_string()),
            StoreError::UsernameTaken => {
                ApiError::Conflict("A user with that username already exists".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                ApiError::Authentication(err.to_string())
            }
            AuthError::WeakPassword(msg) => ApiError::Validation(msg),
            AuthError::Hashing(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_404() {
        let err: ApiError = StoreError::NotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn username_taken_maps_to_conflict() {
        let err: ApiError = StoreError::UsernameTaken.into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn auth_errors_map_to_401() {
        let err: ApiError = AuthError::InvalidCredentials.into();
        assert!(matches!(err, ApiError::Authentication(_)));

        let err: ApiError = AuthError::InvalidToken.into();
        assert!(matches!(err, ApiError::Authentication(_)));
    }

    #[test]
    fn weak_password_maps_to_validation() {
        let err: ApiError = AuthError::WeakPassword("too short".into()).into();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
