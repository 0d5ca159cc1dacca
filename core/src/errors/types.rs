//! Domain-specific error types for credential, token and session operations
//!
//! The security-relevant distinctions kept here (revoked vs. expired vs.
//! idle session) are for internal audit logs. The services collapse them to
//! [`AuthError::Unauthorized`] before they reach a caller.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown identifier, inactive account or wrong secret; never distinguished
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User account is inactive")]
    UserInactive,

    #[error("Session expired due to inactivity")]
    SessionExpired,

    /// Umbrella error surfaced for every refresh and reset failure
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Already registered: {field}")]
    Conflict { field: String },
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed token, bad signature, wrong issuer/audience or wrong type
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token not issued for this purpose")]
    WrongPurpose,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}
