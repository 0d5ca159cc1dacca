//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the ChangeGate auth
//! core. It provides MySQL implementations of the credential store and the
//! token ledgers consumed by `cg_core`.
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use cg_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

#[cfg(feature = "mysql")]
pub use database::{
    DatabasePool, MySqlCredentialStore, MySqlPasswordResetLedger, MySqlTokenLedger, PoolStatistics,
};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Config(message) => DomainError::internal(message),
            other => DomainError::infrastructure(other.to_string()),
        }
    }
}
