//! Shared configuration and common types for the ChangeGate server
//!
//! This crate provides functionality used across all server crates:
//! - Configuration types
//! - Error response structures

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, Environment, JwtConfig, LedgerCleanupConfig,
    LogFormat, LoggingConfig, PasswordResetConfig, RevocationConfig, SessionConfig,
};
pub use errors::{error_codes, ErrorResponse, IntoErrorResponse};
