//! In-memory revocation registry (token blacklist)

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::entities::revocation::RevocationEntry;
use crate::domain::entities::token::RevocationReason;
use crate::services::clock::Clock;
use crate::services::sweeper::PeriodicTask;

/// Revoked token identifiers with expiry-based eviction.
///
/// Entries are keyed by `jti`. An entry whose expiry has passed is treated as
/// absent: a lookup removes it atomically and reports "not revoked", since
/// the token itself is no longer valid. The periodic sweep only bounds
/// memory; correctness never depends on it.
pub struct RevocationRegistry {
    entries: DashMap<String, RevocationEntry>,
    clock: Arc<dyn Clock>,
    sweep_interval: Duration,
    sweeper: PeriodicTask,
}

impl RevocationRegistry {
    pub fn new(clock: Arc<dyn Clock>, sweep_interval: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            sweep_interval,
            sweeper: PeriodicTask::new("revocation-sweep"),
        }
    }

    /// Insert or overwrite the entry for `jti`. Idempotent.
    pub fn revoke(&self, jti: &str, expires_at: DateTime<Utc>, reason: RevocationReason) {
        let entry = RevocationEntry {
            jti: jti.to_string(),
            expires_at,
            revoked_at: self.clock.now(),
            reason,
        };
        self.entries.insert(jti.to_string(), entry);
        debug!(jti = %jti, reason = %reason, "Token added to revocation registry");
    }

    /// True only if an unexpired entry exists for `jti`
    pub fn is_revoked(&self, jti: &str) -> bool {
        let now = self.clock.now();

        if self
            .entries
            .remove_if(jti, |_, entry| entry.is_expired_at(now))
            .is_some()
        {
            debug!(jti = %jti, "Evicted expired revocation entry on lookup");
            return false;
        }

        // A concurrent revoke may land between the two calls; re-check expiry
        // rather than trusting presence alone.
        self.entries
            .get(jti)
            .map(|entry| !entry.is_expired_at(now))
            .unwrap_or(false)
    }

    /// The live entry for `jti`, if any
    pub fn entry(&self, jti: &str) -> Option<RevocationEntry> {
        let now = self.clock.now();
        self.entries
            .get(jti)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.clone())
    }

    /// Remove every expired entry
    ///
    /// # Returns
    /// Number of entries removed
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before.saturating_sub(self.entries.len());

        if removed > 0 {
            info!(removed, remaining = self.entries.len(), "Swept expired revocation entries");
        }
        removed
    }

    /// Number of stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start the periodic sweep. The task holds only a weak reference, so
    /// dropping the registry ends it on the next tick.
    pub fn start(self: &Arc<Self>) -> bool {
        let registry = Arc::downgrade(self);
        self.sweeper.start(self.sweep_interval, move || {
            let registry = registry.clone();
            async move {
                if let Some(registry) = registry.upgrade() {
                    registry.sweep();
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
