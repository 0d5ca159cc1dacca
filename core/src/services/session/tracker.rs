//! Per-user session activity tracking with an inactivity timeout

use chrono::Duration;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::entities::session::{SessionInfo, SessionRecord, SessionStats};
use crate::services::clock::Clock;
use crate::services::sweeper::PeriodicTask;

/// In-memory session table with a single slot per user.
///
/// Inactivity is enforced lazily by `is_active` and `touch`, and eagerly by
/// the periodic sweep. The sweep only narrows the window in which a stale
/// active flag is visible to introspection.
pub struct SessionTracker {
    sessions: DashMap<Uuid, SessionRecord>,
    clock: Arc<dyn Clock>,
    inactivity_timeout: Duration,
    sweep_interval: std::time::Duration,
    sweeper: PeriodicTask,
}

impl SessionTracker {
    pub fn new(
        clock: Arc<dyn Clock>,
        inactivity_timeout: Duration,
        sweep_interval: std::time::Duration,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            clock,
            inactivity_timeout,
            sweep_interval,
            sweeper: PeriodicTask::new("session-sweep"),
        }
    }

    pub fn inactivity_timeout(&self) -> Duration {
        self.inactivity_timeout
    }

    /// Create the user's session, replacing any prior one
    pub fn create_session(
        &self,
        user_id: Uuid,
        access_token: String,
        refresh_token: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> SessionInfo {
        let now = self.clock.now();
        let record = SessionRecord::new(user_id, access_token, refresh_token, now, ip_address, user_agent);
        let info = record.info_at(now, self.inactivity_timeout);

        if self.sessions.insert(user_id, record).is_some() {
            debug!(user_id = %user_id, "Replaced existing session");
        }
        info!(user_id = %user_id, "Session created");
        info
    }

    /// Whether the user has an active, non-idle session.
    ///
    /// An idle session is flipped to inactive as a side effect.
    pub fn is_active(&self, user_id: Uuid) -> bool {
        let now = self.clock.now();
        let Some(mut session) = self.sessions.get_mut(&user_id) else {
            return false;
        };

        if !session.is_active {
            return false;
        }
        if session.is_idle_at(now, self.inactivity_timeout) {
            session.is_active = false;
            info!(user_id = %user_id, "Session expired due to inactivity");
            return false;
        }
        true
    }

    /// Record activity. Fails without mutating anything when the session is
    /// absent, inactive or idle past the timeout.
    pub fn touch(&self, user_id: Uuid) -> bool {
        let now = self.clock.now();
        let Some(mut session) = self.sessions.get_mut(&user_id) else {
            return false;
        };

        if !session.is_active || session.is_idle_at(now, self.inactivity_timeout) {
            return false;
        }
        session.last_activity = now;
        true
    }

    /// Swap in the pair minted from `rotated_refresh` after a rotation.
    ///
    /// The session keeps its tokens unless it still holds `rotated_refresh`,
    /// so rotating a lineage evicted by a later login cannot take over the
    /// slot.
    pub fn replace_tokens(
        &self,
        user_id: Uuid,
        rotated_refresh: &str,
        access_token: String,
        refresh_token: String,
    ) -> bool {
        match self.sessions.get_mut(&user_id) {
            Some(mut session) if session.refresh_token == rotated_refresh => {
                session.access_token = access_token;
                session.refresh_token = refresh_token;
                true
            }
            Some(_) => {
                debug!(user_id = %user_id, "Rotated token is not the session's current pair");
                false
            }
            None => false,
        }
    }

    /// Drop the user's session entirely
    pub fn remove(&self, user_id: Uuid) -> Option<SessionRecord> {
        let removed = self.sessions.remove(&user_id).map(|(_, session)| session);
        if removed.is_some() {
            info!(user_id = %user_id, "Session removed");
        }
        removed
    }

    /// Mark the user's session inactive, keeping it visible to introspection
    pub fn expire(&self, user_id: Uuid, reason: &str) -> bool {
        match self.sessions.get_mut(&user_id) {
            Some(mut session) if session.is_active => {
                session.is_active = false;
                info!(user_id = %user_id, reason, "Session expired");
                true
            }
            _ => false,
        }
    }

    /// Drop every session
    ///
    /// # Returns
    /// Number of sessions that were active
    pub fn force_logout_all(&self, reason: &str) -> usize {
        let mut active = 0;
        self.sessions.retain(|_, session| {
            if session.is_active {
                active += 1;
            }
            false
        });
        info!(count = active, reason, "Forced logout of all sessions");
        active
    }

    /// Seconds until the session goes idle, `None` without an active session
    pub fn time_remaining(&self, user_id: Uuid) -> Option<i64> {
        if !self.is_active(user_id) {
            return None;
        }
        let now = self.clock.now();
        self.sessions
            .get(&user_id)
            .map(|session| session.remaining_at(now, self.inactivity_timeout))
    }

    /// The access token of the user's current session
    pub fn current_access_token(&self, user_id: Uuid) -> Option<String> {
        self.sessions
            .get(&user_id)
            .map(|session| session.access_token.clone())
    }

    pub fn session(&self, user_id: Uuid) -> Option<SessionInfo> {
        let now = self.clock.now();
        self.sessions
            .get(&user_id)
            .map(|session| session.info_at(now, self.inactivity_timeout))
    }

    /// Sessions currently marked active and not idle, for admin tooling
    pub fn active_sessions(&self) -> Vec<SessionInfo> {
        let now = self.clock.now();
        self.sessions
            .iter()
            .filter(|session| session.is_active && !session.is_idle_at(now, self.inactivity_timeout))
            .map(|session| session.info_at(now, self.inactivity_timeout))
            .collect()
    }

    pub fn stats(&self) -> SessionStats {
        let now = self.clock.now();
        let mut stats = SessionStats::default();
        for session in self.sessions.iter() {
            stats.total += 1;
            if session.is_active && !session.is_idle_at(now, self.inactivity_timeout) {
                stats.active += 1;
            } else {
                stats.inactive += 1;
            }
        }
        stats
    }

    /// Flip every idle session that is still marked active
    ///
    /// # Returns
    /// Number of sessions flipped
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut expired = 0;

        for mut session in self.sessions.iter_mut() {
            if session.is_active && session.is_idle_at(now, self.inactivity_timeout) {
                session.is_active = false;
                expired += 1;
            }
        }

        if expired > 0 {
            info!(expired, "Expired idle sessions");
        }
        expired
    }

    /// Start the periodic sweep
    pub fn start(self: &Arc<Self>) -> bool {
        let tracker = Arc::downgrade(self);
        self.sweeper.start(self.sweep_interval, move || {
            let tracker = tracker.clone();
            async move {
                if let Some(tracker) = tracker.upgrade() {
                    tracker.sweep();
                }
            }
        })
    }

    pub async fn stop(&self) {
        self.sweeper.stop().await;
    }

    pub fn is_running(&self) -> bool {
        self.sweeper.is_running()
    }
}
