//! Mock implementation of PasswordResetLedger for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::entities::password_reset::PasswordResetToken;
use crate::errors::DomainError;

use super::r#trait::PasswordResetLedger;

#[derive(Default)]
pub struct MockPasswordResetLedger {
    pub tokens: Arc<Mutex<Vec<PasswordResetToken>>>,
}

impl MockPasswordResetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl PasswordResetLedger for MockPasswordResetLedger {
    async fn insert(&self, token: PasswordResetToken) -> Result<(), DomainError> {
        self.tokens.lock().unwrap().push(token);
        Ok(())
    }

    async fn find_usable(
        &self,
        token_hash: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordResetToken>, DomainError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens
            .iter()
            .find(|t| t.token_hash == token_hash && t.user_id == user_id && t.is_usable_at(now))
            .cloned())
    }

    async fn mark_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.lock().unwrap();
        Ok(tokens
            .iter_mut()
            .find(|t| t.id == id)
            .map(|t| t.mark_used(at))
            .unwrap_or(false))
    }

    async fn invalidate_for_user(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.lock().unwrap();
        Ok(tokens
            .iter_mut()
            .filter(|t| t.user_id == user_id)
            .map(|t| t.mark_used(at))
            .filter(|used| *used)
            .count())
    }
}
