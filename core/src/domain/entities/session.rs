//! Server-side session records tracked for inactivity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user's session. There is at most one per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub is_active: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl SessionRecord {
    pub fn new(
        user_id: Uuid,
        access_token: String,
        refresh_token: String,
        now: DateTime<Utc>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            user_id,
            access_token,
            refresh_token,
            created_at: now,
            last_activity: now,
            is_active: true,
            ip_address,
            user_agent,
        }
    }

    /// Idle strictly longer than `timeout`
    pub fn is_idle_at(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_activity > timeout
    }

    /// Seconds left before the session goes idle, clamped at zero
    pub fn remaining_at(&self, now: DateTime<Utc>, timeout: Duration) -> i64 {
        (timeout - (now - self.last_activity)).num_seconds().max(0)
    }

    /// Public view without token values
    pub fn info_at(&self, now: DateTime<Utc>, timeout: Duration) -> SessionInfo {
        SessionInfo {
            user_id: self.user_id,
            created_at: self.created_at,
            last_activity: self.last_activity,
            is_active: self.is_active,
            expires_in: if self.is_active { self.remaining_at(now, timeout) } else { 0 },
            ip_address: self.ip_address.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Session details safe to return to clients and admin tooling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub is_active: bool,
    /// Seconds until the inactivity timeout
    pub expires_in: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Session counts for admin tooling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}
