//! In-memory implementation of TokenLedger for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::{RefreshTokenRecord, RevocationReason, TokenStatistics};
use crate::errors::DomainError;

use super::r#trait::TokenLedger;

/// Mock token ledger for testing
#[derive(Default)]
pub struct MockTokenLedger {
    records: Arc<RwLock<HashMap<String, RefreshTokenRecord>>>,
    unavailable: AtomicBool,
    delay_ms: AtomicU64,
}

impl MockTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the database were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every call by `delay`
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub async fn get(&self, id: &str) -> Option<RefreshTokenRecord> {
        self.records.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    async fn check(&self) -> Result<(), DomainError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::infrastructure("ledger unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenLedger for MockTokenLedger {
    async fn insert(&self, record: RefreshTokenRecord) -> Result<(), DomainError> {
        self.check().await?;
        let mut records = self.records.write().await;
        records.entry(record.id.clone()).or_insert(record);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<RefreshTokenRecord>, DomainError> {
        self.check().await?;
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn mark_revoked(
        &self,
        id: &str,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.check().await?;
        let mut records = self.records.write().await;
        Ok(records
            .get_mut(id)
            .map(|record| record.revoke(reason, at))
            .unwrap_or(false))
    }

    async fn touch_last_used(&self, id: &str, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.check().await?;
        if let Some(record) = self.records.write().await.get_mut(id) {
            record.last_used_at = Some(at);
        }
        Ok(())
    }

    async fn find_active_by_user(&self, user_id: Uuid) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        self.check().await?;
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.user_id == user_id && !r.is_revoked)
            .cloned()
            .collect())
    }

    async fn mark_all_revoked_for_user(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        self.check().await?;
        let mut records = self.records.write().await;
        Ok(records
            .values_mut()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.revoke(reason, at))
            .filter(|revoked| *revoked)
            .count())
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<TokenStatistics, DomainError> {
        self.check().await?;
        let records = self.records.read().await;
        let mut stats = TokenStatistics::default();
        for record in records.values() {
            stats.total += 1;
            if record.is_revoked {
                stats.revoked += 1;
            } else if record.is_expired_at(now) {
                stats.expired += 1;
            } else {
                stats.active += 1;
            }
        }
        Ok(stats)
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<usize, DomainError> {
        self.check().await?;
        let mut records = self.records.write().await;
        let initial = records.len();
        records.retain(|_, r| r.expires_at >= before);
        Ok(initial - records.len())
    }
}
