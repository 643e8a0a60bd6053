/**
 * Error Types
 * Request-level errors rendered as JSON, plus fatal startup errors
 */
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::db::StoreError;
use crate::media::MediaError;
use crate::routes::ErrorResponse;

/// Where the admin UI sends a visitor whose session is gone.
pub const LOGIN_REDIRECT: &str = "/admin";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("{0}")]
    Validation(String),

    /// Body, query string or path that could not be decoded.
    #[error("Invalid request: {0}")]
    Malformed(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Too many login attempts. Please try again later.")]
    TooManyAttempts,

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),

    /// A not-found error carrying the page the client should fall back to.
    #[error("{inner}")]
    WithFallback { inner: Box<AppError>, to: &'static str },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            AppError::Store(StoreError::NotFound(_)) => true,
            AppError::WithFallback { inner, .. } => inner.is_not_found(),
            _ => false,
        }
    }

    /// Attaches a redirect target to not-found errors; other errors pass through.
    pub fn with_fallback(self, to: &'static str) -> Self {
        if self.is_not_found() {
            AppError::WithFallback {
                inner: Box::new(self),
                to,
            }
        } else {
            self
        }
    }

    fn parts(&self) -> (StatusCode, ErrorResponse) {
        match self {
            AppError::Store(StoreError::NotFound(what)) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("Not found").with_message(format!("{} not found", what)),
            ),
            AppError::Store(StoreError::Database(e)) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Database error"),
                )
            }
            AppError::Media(e @ MediaError::TooLarge { .. }) => {
                tracing::debug!(error = ?e, "upload rejected");
                (StatusCode::PAYLOAD_TOO_LARGE, ErrorResponse::new(e.to_string()))
            }
            AppError::Media(e @ (MediaError::Empty | MediaError::NotAnImage)) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(e.to_string()))
            }
            AppError::Media(MediaError::Storage(detail)) => {
                tracing::error!(error = %detail, "object storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Error uploading image"),
                )
            }
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(message.clone()))
            }
            AppError::Malformed(detail) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Invalid request").with_message(detail.clone()),
            ),
            AppError::Unauthorized(reason) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("Unauthorized")
                    .with_message(*reason)
                    .with_redirect(LOGIN_REDIRECT),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("Invalid credentials"),
            ),
            AppError::TooManyAttempts => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorResponse::new(self.to_string()),
            ),
            AppError::Upstream(message) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::new(message.clone()),
            ),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
            AppError::WithFallback { inner, to } => {
                let (status, body) = inner.parts();
                (status, body.with_redirect(*to))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Malformed(rejection.body_text())
    }
}

/// `result.fallback_to("/")` turns a not-found into a redirecting 404.
pub trait NotFoundFallback<T> {
    fn fallback_to(self, to: &'static str) -> Result<T, AppError>;
}

impl<T, E: Into<AppError>> NotFoundFallback<T> for Result<T, E> {
    fn fallback_to(self, to: &'static str) -> Result<T, AppError> {
        self.map_err(|e| e.into().with_fallback(to))
    }
}

/// Fatal errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("database unavailable: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to prepare admin credentials: {0}")]
    Credentials(#[from] bcrypt::BcryptError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
