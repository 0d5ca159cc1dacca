//! Mock implementation of CredentialStore for testing

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::entities::credential::CredentialRecord;
use crate::errors::{AuthError, DomainError};

use super::r#trait::CredentialStore;

#[derive(Default)]
pub struct MockCredentialStore {
    pub users: Arc<Mutex<Vec<CredentialRecord>>>,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: CredentialRecord) -> Self {
        let store = Self::new();
        store.users.lock().unwrap().push(user);
        store
    }

    /// Flip the active flag of a stored user
    pub fn set_active(&self, id: Uuid, active: bool) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.is_active = active;
        }
    }

    pub fn secret_hash(&self, id: Uuid) -> Option<String> {
        let users = self.users.lock().unwrap();
        users.iter().find(|u| u.id == id).map(|u| u.secret_hash.clone())
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<CredentialRecord>, DomainError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.identifier == identifier).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, DomainError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CredentialRecord>, DomainError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_secret_hash(&self, id: Uuid, secret_hash: &str) -> Result<(), DomainError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.secret_hash = secret_hash.to_string();
                Ok(())
            }
            None => Err(DomainError::NotFound {
                resource: format!("credential {}", id),
            }),
        }
    }

    async fn create(&self, record: CredentialRecord) -> Result<CredentialRecord, DomainError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.identifier == record.identifier) {
            return Err(AuthError::Conflict { field: "identifier".to_string() }.into());
        }
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&record.email)) {
            return Err(AuthError::Conflict { field: "email".to_string() }.into());
        }
        users.push(record.clone());
        Ok(record)
    }
}
