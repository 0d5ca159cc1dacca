//! Credential store trait: the auth core's read view of user accounts.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::credential::CredentialRecord;
use crate::errors::DomainError;

/// Looks up users for authentication.
///
/// The auth core never mutates a credential except for its secret hash
/// (password reset) and never deletes one.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a credential by its login identifier
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<CredentialRecord>, DomainError>;

    /// Find a credential by email address
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, DomainError>;

    /// Find a credential by user id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CredentialRecord>, DomainError>;

    /// Replace the stored secret hash
    ///
    /// # Returns
    /// * `Err(DomainError::NotFound)` - No credential with that id
    async fn update_secret_hash(&self, id: Uuid, secret_hash: &str) -> Result<(), DomainError>;

    /// Create a credential
    ///
    /// # Returns
    /// * `Err(DomainError::Auth(AuthError::Conflict))` - Identifier or email already taken
    async fn create(&self, record: CredentialRecord) -> Result<CredentialRecord, DomainError>;
}
