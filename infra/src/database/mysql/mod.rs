//! MySQL implementations of the core repository traits.

mod credential_store_impl;
mod password_reset_ledger_impl;
mod token_ledger_impl;

pub use credential_store_impl::MySqlCredentialStore;
pub use password_reset_ledger_impl::MySqlPasswordResetLedger;
pub use token_ledger_impl::MySqlTokenLedger;

use cg_core::errors::DomainError;
use uuid::Uuid;

/// Map a failed query to a retryable infrastructure error
pub(crate) fn query_error(context: &str, err: sqlx::Error) -> DomainError {
    tracing::error!(error = %err, context, "Database query failed");
    DomainError::infrastructure(format!("{}: {}", context, err))
}

/// Map a row decoding failure to an internal error
pub(crate) fn column_error(column: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::Internal {
        message: format!("Failed to get {}: {}", column, err),
    }
}

/// Parse a CHAR(36) UUID column
pub(crate) fn parse_uuid(column: &str, value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|e| column_error(column, e))
}

/// Whether the error is a unique key violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
