use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use eventify_core::{ErrorKind, SuperUserServiceError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<SuperUserServiceError> for AppError {
    fn from(err: SuperUserServiceError) -> Self {
        match err.kind() {
            ErrorKind::Validation => Self::bad_request(err.to_string()),
            ErrorKind::NotFound => Self::not_found(err.to_string()),
            ErrorKind::Storage => {
                tracing::error!(error = %err, "storage operation failed");
                Self::internal("Storage operation failed")
            }
            ErrorKind::Internal => {
                tracing::error!(error = %err, "internal service failure");
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl From<eventify_model::ModelError> for AppError {
    fn from(err: eventify_model::ModelError) -> Self {
        Self::bad_request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventify_core::CoreError;

    #[test]
    fn service_errors_map_to_status_codes() {
        let not_found = SuperUserServiceError::Repository {
            operation: "failed to get superuser by id",
            source: CoreError::NotFound("superuser 1".into()),
        };
        assert_eq!(AppError::from(not_found).status, StatusCode::NOT_FOUND);

        let storage = SuperUserServiceError::Repository {
            operation: "failed to create superuser",
            source: CoreError::Storage("connection reset".into()),
        };
        let mapped = AppError::from(storage);
        assert_eq!(mapped.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!mapped.message.contains("connection reset"));
    }
}
