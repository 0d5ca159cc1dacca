//! Delivery seam for password reset links

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::credential::CredentialRecord;
use crate::errors::DomainError;

/// Delivers a password reset token to its owner.
///
/// Rendering and transport (mail, chat) live outside the auth core.
#[async_trait]
pub trait PasswordResetNotifier: Send + Sync {
    async fn send_reset_link(
        &self,
        user: &CredentialRecord,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;
}

/// Notifier that drops every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpPasswordResetNotifier;

#[async_trait]
impl PasswordResetNotifier for NoOpPasswordResetNotifier {
    async fn send_reset_link(
        &self,
        _user: &CredentialRecord,
        _token: &str,
        _expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        Ok(())
    }
}
