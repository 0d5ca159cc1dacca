//! Durable ledger of issued refresh tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{RefreshTokenRecord, RevocationReason, TokenStatistics};
use crate::errors::DomainError;

/// Persists refresh-token records across process restarts.
///
/// The ledger is the authoritative source of truth for refresh-token
/// revocation; the in-memory registry only caches it.
///
/// # Concurrency
/// - `insert` is idempotent on `id`: a duplicate insert is success.
/// - `mark_revoked` is a compare-and-set: exactly one concurrent caller
///   observes `true` for a given record.
///
/// All methods return `DomainError::Infrastructure` when the backing store
/// is unreachable.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Store a newly issued refresh token
    async fn insert(&self, record: RefreshTokenRecord) -> Result<(), DomainError>;

    /// Find a record by its `jti`
    async fn find_by_id(&self, id: &str) -> Result<Option<RefreshTokenRecord>, DomainError>;

    /// Revoke a single record
    ///
    /// # Returns
    /// * `Ok(true)` - This call flipped the record to revoked
    /// * `Ok(false)` - The record was already revoked or does not exist
    async fn mark_revoked(
        &self,
        id: &str,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Record a successful use of the token for rotation
    async fn touch_last_used(&self, id: &str, at: DateTime<Utc>) -> Result<(), DomainError>;

    /// All non-revoked records of a user, expired or not
    async fn find_active_by_user(&self, user_id: Uuid) -> Result<Vec<RefreshTokenRecord>, DomainError>;

    /// Revoke every non-revoked record of a user
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records this call revoked
    async fn mark_all_revoked_for_user(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Row counts as of `now`
    async fn stats(&self, now: DateTime<Utc>) -> Result<TokenStatistics, DomainError>;

    /// Delete records that expired before `before`
    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<usize, DomainError>;
}
