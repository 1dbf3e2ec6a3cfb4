use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::document::ValidationError;
use crate::selection::SelectionError;
use crate::store::StoreError;

/// Errors surfaced to HTTP callers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Malformed request: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error(transparent)]
    InsufficientOptions(#[from] SelectionError),

    #[error("Only the activated session can {0}")]
    NotActivator(&'static str),

    #[error("Invalid activation code")]
    ActivationRejected,

    #[error("Restaurant not found: {0}")]
    NotFound(String),
}

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub msg: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InsufficientOptions(_) => StatusCode::CONFLICT,
            AppError::NotActivator(_) => StatusCode::FORBIDDEN,
            AppError::ActivationRejected => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::InsufficientOptions(_) => "INSUFFICIENT_OPTIONS",
            AppError::NotActivator(_) => "UNAUTHORIZED",
            AppError::ActivationRejected => "ACTIVATION_REJECTED",
            AppError::NotFound(_) => "NOT_FOUND",
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::StoreUnavailable(ref e) = self {
            tracing::error!("Store failure surfaced to client: {}", e);
        }

        let body = ErrorBody {
            code: self.code().to_string(),
            msg: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(SelectionError::InsufficientOptions { eligible: 1 }).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotActivator("add restaurants").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::ActivationRejected.status(),
            StatusCode::UNAUTHORIZED
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        assert_eq!(
            AppError::from(StoreError::from(io)).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_validation_error_message_carries_through() {
        let err = AppError::from(ValidationError::EmptyName);
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_insufficient_options_message() {
        let err = AppError::from(SelectionError::InsufficientOptions { eligible: 1 });
        assert!(err.to_string().contains("at least 2"));
    }
}
