//! Registry Error Types

use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response, Json},
};
use utoipa::ToSchema;

use crate::user::entity::UserId;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("user not found: {id}")]
    NotFound { id: UserId },

    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error("user name already taken: {name}")]
    Conflict { name: String },

    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl RegistryError {
    pub fn not_found(id: UserId) -> Self {
        Self::NotFound { id }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict { name: name.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// True for outcomes that callers are expected to handle as business
    /// failures rather than infrastructure faults.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Forbidden { .. } | Self::Conflict { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Error response body
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            RegistryError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            RegistryError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            RegistryError::Conflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
