//! Single-use password reset tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable record of an issued reset token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    /// SHA-256 hex digest of the token value
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Set once, when the token is consumed or superseded
    pub used_at: Option<DateTime<Utc>>,
}

impl PasswordResetToken {
    pub fn new(
        user_id: Uuid,
        token_hash: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            created_at,
            expires_at,
            used_at: None,
        }
    }

    /// Unused and unexpired
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && self.expires_at > now
    }

    /// Marks the token used; `false` if it already was
    pub fn mark_used(&mut self, at: DateTime<Utc>) -> bool {
        if self.used_at.is_some() {
            return false;
        }
        self.used_at = Some(at);
        true
    }
}
