//! Credential record as exposed by the credential store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a ChangeGate user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Approves or rejects outage and change requests
    Approver,
    /// Raises outage and change requests
    Requester,
    /// Read-only access
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Approver => "approver",
            Role::Requester => "requester",
            Role::Viewer => "viewer",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "approver" => Ok(Role::Approver),
            "requester" => Ok(Role::Requester),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// A user's login credential. Read-only to the auth core except for
/// `secret_hash`, which is replaced on password reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub id: Uuid,

    /// Login identifier
    pub identifier: String,

    pub email: String,

    /// bcrypt hash of the secret
    #[serde(skip_serializing)]
    pub secret_hash: String,

    pub role: Role,

    pub tenant_id: Option<Uuid>,

    pub is_active: bool,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Creates a new active credential
    pub fn new(
        identifier: impl Into<String>,
        email: impl Into<String>,
        secret_hash: String,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier: identifier.into(),
            email: email.into(),
            secret_hash,
            role,
            tenant_id: None,
            is_active: true,
            first_name: None,
            last_name: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// Name to show in the UI, falling back to the identifier
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.identifier.clone(),
        }
    }
}

/// Registration input
#[derive(Debug, Clone, Deserialize)]
pub struct NewCredential {
    pub identifier: String,
    pub email: String,
    pub secret: String,
    pub role: Role,
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}
