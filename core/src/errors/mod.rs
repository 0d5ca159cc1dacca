//! Domain-specific error types and error handling.

mod types;


pub use types::{AuthError, TokenError};

use cg_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// A durable store or other collaborator could not be reached; retryable
    #[error("Infrastructure unavailable: {message}")]
    Infrastructure { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Shorthand for an infrastructure failure
    pub fn infrastructure(message: impl Into<String>) -> Self {
        DomainError::Infrastructure {
            message: message.into(),
        }
    }

    /// Shorthand for an internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    /// Whether the caller may retry the same operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Infrastructure { .. })
    }

    /// Whether this error is an authentication or token verdict rather
    /// than an infrastructure or programming failure
    pub fn is_security_failure(&self) -> bool {
        match self {
            DomainError::Token(TokenError::TokenGenerationFailed) => false,
            DomainError::Token(_) => true,
            DomainError::Auth(AuthError::Conflict { .. }) => false,
            DomainError::Auth(_) => true,
            _ => false,
        }
    }

    /// Stable error code for the transport layer
    ///
    /// Every token and session verdict maps to `UNAUTHORIZED` so that the
    /// code itself cannot be used as an oracle.
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => error_codes::VALIDATION_ERROR,
            DomainError::NotFound { .. } => error_codes::NOT_FOUND,
            DomainError::Infrastructure { .. } => error_codes::SERVICE_UNAVAILABLE,
            DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
            DomainError::Auth(AuthError::InvalidCredentials) => error_codes::INVALID_CREDENTIALS,
            DomainError::Auth(AuthError::Conflict { .. }) => error_codes::CONFLICT,
            DomainError::Auth(_) => error_codes::UNAUTHORIZED,
            DomainError::Token(TokenError::TokenGenerationFailed) => error_codes::INTERNAL_ERROR,
            DomainError::Token(_) => error_codes::UNAUTHORIZED,
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        let message = match self.error_code() {
            error_codes::UNAUTHORIZED => "Unauthorized".to_string(),
            error_codes::INTERNAL_ERROR => "Internal server error".to_string(),
            error_codes::SERVICE_UNAVAILABLE => "Service temporarily unavailable".to_string(),
            _ => self.to_string(),
        };

        ErrorResponse::new(self.error_code(), message).retryable(self.is_retryable())
    }
}
