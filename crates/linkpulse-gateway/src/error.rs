use crate::model::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use linkpulse_analytics::AnalyticsError;
use linkpulse_core::CoreError;
use linkpulse_resolver::ResolverError;
use linkpulse_shortener::ShortenerError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing owner identity")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // internal details stay in the log
        let message = match &self {
            AppError::Unavailable(detail) | AppError::Internal(detail) => {
                error!(status = status.as_u16(), error = %detail, "Request failed");
                status
                    .canonical_reason()
                    .unwrap_or("internal error")
                    .to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<ShortenerError> for AppError {
    fn from(err: ShortenerError) -> Self {
        match err {
            ShortenerError::AliasConflict(alias) => {
                AppError::Conflict(format!("alias already exists: {alias}"))
            }
            ShortenerError::InvalidUrl(_) => AppError::BadRequest(err.to_string()),
            ShortenerError::GenerationExhausted { .. } => AppError::Internal(err.to_string()),
            ShortenerError::Storage(detail) => AppError::Unavailable(detail),
        }
    }
}

impl From<ResolverError> for AppError {
    fn from(err: ResolverError) -> Self {
        match err {
            ResolverError::NotFound(_) => AppError::NotFound("URL not found".to_string()),
            ResolverError::Storage(detail) => AppError::Unavailable(detail),
        }
    }
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::NotFound(_) => AppError::NotFound("URL not found".to_string()),
            AnalyticsError::Storage(detail) => AppError::Unavailable(detail),
        }
    }
}
