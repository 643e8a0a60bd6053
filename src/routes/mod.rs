/**
 * Routes Module
 * API route handlers
 */

pub mod auth;
pub mod blog;
pub mod contact;
pub mod dashboard;
pub mod extract;
pub mod github;
pub mod health;
pub mod logs;
pub mod projects;
pub mod rss;
pub mod settings;
pub mod site;
pub mod skills;
pub mod upload;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Page the client should navigate to instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            redirect: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }
}

/// Success response (for delete)
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Rejects blank values for required form fields.
pub(crate) fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Like [`require`] for fields a partial update may omit.
pub(crate) fn require_if_present(field: &str, value: Option<&String>) -> Result<(), AppError> {
    value.map_or(Ok(()), |v| require(field, v))
}
