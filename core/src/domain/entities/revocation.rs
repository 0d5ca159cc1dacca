//! Entries of the in-memory revocation registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::token::RevocationReason;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationEntry {
    pub jti: String,
    /// Copied from the token's own `exp`
    pub expires_at: DateTime<Utc>,
    pub revoked_at: DateTime<Utc>,
    pub reason: RevocationReason,
}

impl RevocationEntry {
    /// Past its expiry the entry is logically absent
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
