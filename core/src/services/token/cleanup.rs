//! Periodic maintenance of the refresh token ledger
//!
//! Deletes ledger rows that expired longer than a grace period ago and logs
//! ledger statistics on every cycle.

use cg_shared::config::LedgerCleanupConfig;
use chrono::Duration;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::entities::token::TokenStatistics;
use crate::repositories::{CredentialStore, TokenLedger};
use crate::services::sweeper::PeriodicTask;

use super::rotation::TokenRotationService;

/// Configuration for ledger cleanup
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Grace period after expiry before deletion (in days)
    pub grace_period_days: i64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            grace_period_days: 7,   // Keep expired tokens for 7 days
            enabled: true,
        }
    }
}

impl From<&LedgerCleanupConfig> for TokenCleanupConfig {
    fn from(config: &LedgerCleanupConfig) -> Self {
        Self {
            interval_seconds: config.interval_seconds,
            grace_period_days: config.grace_period_days,
            enabled: config.enabled,
        }
    }
}

/// Background service purging expired ledger rows
pub struct TokenCleanupService<L, C>
where
    L: TokenLedger + 'static,
    C: CredentialStore + 'static,
{
    rotation: Arc<TokenRotationService<L, C>>,
    config: TokenCleanupConfig,
    task: PeriodicTask,
}

impl<L, C> TokenCleanupService<L, C>
where
    L: TokenLedger + 'static,
    C: CredentialStore + 'static,
{
    pub fn new(rotation: Arc<TokenRotationService<L, C>>, config: TokenCleanupConfig) -> Self {
        Self {
            rotation,
            config,
            task: PeriodicTask::new("ledger-cleanup"),
        }
    }

    /// Run a single cleanup cycle
    ///
    /// Failures of individual steps are collected into the result rather
    /// than aborting the cycle.
    pub async fn run_cleanup(&self) -> CleanupResult {
        if !self.config.enabled {
            return CleanupResult::default();
        }

        let mut result = CleanupResult::default();

        match self
            .rotation
            .purge_expired(Duration::days(self.config.grace_period_days))
            .await
        {
            Ok(count) => result.expired_tokens_deleted = count,
            Err(e) => {
                error!(error = %e, "Failed to purge expired refresh tokens");
                result.errors.push(format!("Token cleanup error: {}", e));
            }
        }

        match self.rotation.statistics().await {
            Ok(stats) => result.statistics = Some(stats),
            Err(e) => {
                error!(error = %e, "Failed to read ledger statistics");
                result.errors.push(format!("Statistics error: {}", e));
            }
        }

        let stats = result.statistics.unwrap_or_default();
        info!(
            deleted = result.expired_tokens_deleted,
            total = stats.total,
            active = stats.active,
            revoked = stats.revoked,
            expired = stats.expired,
            "Ledger cleanup completed"
        );

        result
    }

    /// Start the cleanup loop; a disabled service does not start
    pub fn start(self: &Arc<Self>) -> bool {
        if !self.config.enabled {
            warn!("Ledger cleanup is disabled");
            return false;
        }

        let service = Arc::downgrade(self);
        self.task.start(
            std::time::Duration::from_secs(self.config.interval_seconds),
            move || {
                let service = service.clone();
                async move {
                    let Some(service) = service.upgrade() else {
                        return;
                    };
                    let result = service.run_cleanup().await;
                    if !result.is_success() {
                        warn!(errors = ?result.errors, "Cleanup completed with errors");
                    }
                }
            },
        )
    }

    pub async fn stop(&self) {
        self.task.stop().await;
    }

    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }
}

/// Result of a cleanup cycle
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of expired refresh tokens deleted
    pub expired_tokens_deleted: usize,
    /// Ledger counts after the purge
    pub statistics: Option<TokenStatistics>,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
