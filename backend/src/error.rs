//! Error handling for the SOILY platform
//!
//! Every failure leaves the API as `{ "error": { code, message, field? } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use report::RenderError;
use serde::Serialize;
use shared::{BoundaryError, FieldError, RecommendationError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    /// `field` names the credential that failed, `email` or `password`
    #[error("Invalid credentials")]
    InvalidCredentials { field: &'static str },

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Account deactivated")]
    AccountDisabled,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Duplicate {field}: {message}")]
    DuplicateEntry { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    // Report rendering
    #[error("Report rendering failed: {0}")]
    Render(#[from] RenderError),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} not found", what))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials { .. }
            | AppError::TokenExpired
            | AppError::InvalidToken
            | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::AccountDisabled | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEntry { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Render(_)
            | AppError::DatabaseError(_)
            | AppError::Internal(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (code, message, field) = match self {
            AppError::InvalidCredentials { field } => (
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
                Some(field.to_string()),
            ),
            AppError::TokenExpired => ("TOKEN_EXPIRED", "Token has expired".to_string(), None),
            AppError::InvalidToken => ("INVALID_TOKEN", "Invalid token".to_string(), None),
            AppError::Unauthorized(msg) => ("UNAUTHORIZED", msg.clone(), None),
            AppError::AccountDisabled => (
                "ACCOUNT_DISABLED",
                "Your account has been deactivated. Please contact support.".to_string(),
                None,
            ),
            AppError::Forbidden(msg) => ("FORBIDDEN", msg.clone(), None),
            AppError::Validation { field, message } => {
                ("VALIDATION_ERROR", message.clone(), Some(field.clone()))
            }
            AppError::BadRequest(msg) => ("BAD_REQUEST", msg.clone(), None),
            AppError::DuplicateEntry { field, message } => {
                ("DUPLICATE_ENTRY", message.clone(), Some(field.clone()))
            }
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone(), None),
            AppError::ExternalService(msg) => (
                "EXTERNAL_SERVICE_ERROR",
                format!("External service error: {}", msg),
                None,
            ),
            AppError::ServiceUnavailable(msg) => ("SERVICE_UNAVAILABLE", msg.clone(), None),
            AppError::Render(_) => (
                "REPORT_ERROR",
                "Error generating PDF report".to_string(),
                None,
            ),
            AppError::DatabaseError(_) => (
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
                None,
            ),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone(), None),
            AppError::InternalError(_) => (
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
                None,
            ),
        };
        ErrorDetail {
            code: code.to_string(),
            message,
            field,
        }
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::validation(err.field, err.message)
    }
}

impl From<BoundaryError> for AppError {
    fn from(err: BoundaryError) -> Self {
        AppError::validation("boundary.coordinates", err.to_string())
    }
}

impl From<RecommendationError> for AppError {
    fn from(err: RecommendationError) -> Self {
        AppError::validation("cropRecommendation", err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let first = errors
            .field_errors()
            .into_iter()
            .next()
            .and_then(|(field, errs)| errs.first().map(|e| (field, e.clone())));
        match first {
            Some((field, err)) => AppError::validation(
                field,
                err.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field)),
            ),
            None => AppError::BadRequest("Invalid request".to_string()),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();

        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::InvalidCredentials { field: "email" }.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::AccountDisabled.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::DuplicateEntry {
                field: "phone".into(),
                message: "Phone number already registered".into()
            }
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::ServiceUnavailable("off".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Render(RenderError::NoAnalyses).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_field_error_keeps_path() {
        let err: AppError = shared::validate_password("short").map_err(|m| FieldError {
            field: "password",
            message: m,
        })
        .unwrap_err()
        .into();
        let detail = err.detail();
        assert_eq!(detail.code, "VALIDATION_ERROR");
        assert_eq!(detail.field.as_deref(), Some("password"));
    }

    #[test]
    fn test_credentials_error_names_field() {
        let detail = AppError::InvalidCredentials { field: "password" }.detail();
        assert_eq!(detail.field.as_deref(), Some("password"));
        assert_eq!(detail.message, "Invalid email or password");
    }
}
