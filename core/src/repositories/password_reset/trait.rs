//! Durable store of password reset tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::password_reset::PasswordResetToken;
use crate::errors::DomainError;

#[async_trait]
pub trait PasswordResetLedger: Send + Sync {
    async fn insert(&self, token: PasswordResetToken) -> Result<(), DomainError>;

    /// The record matching `token_hash` and `user_id` that is unused and
    /// unexpired at `now`
    async fn find_usable(
        &self,
        token_hash: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordResetToken>, DomainError>;

    /// Consume a record. Compare-and-set on `used_at IS NULL`: exactly one
    /// concurrent caller observes `true`.
    async fn mark_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Supersede every unused record of a user
    async fn invalidate_for_user(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<usize, DomainError>;
}
