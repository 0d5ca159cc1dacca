//! Response value objects for the credential and session use cases.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::credential::{CredentialRecord, Role};
use crate::domain::entities::session::SessionInfo;
use crate::domain::entities::token::TokenPair;

/// Generic message returned by `forgot_password` whether or not the
/// account exists
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists for that address, a password reset link has been sent.";

/// Public profile of the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub identifier: String,
    pub display_name: String,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
}

impl From<&CredentialRecord> for UserSummary {
    fn from(record: &CredentialRecord) -> Self {
        Self {
            id: record.id,
            identifier: record.identifier.clone(),
            display_name: record.display_name(),
            role: record.role,
            tenant_id: record.tenant_id,
        }
    }
}

/// Returned by login and registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub tokens: TokenPair,
    pub session: SessionInfo,
    pub user: UserSummary,
}

/// Outcome of a logout. `success` is true for every non-infrastructure
/// outcome, including already-invalid tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogoutResult {
    pub success: bool,
    pub refresh_token_revoked: bool,
    pub access_token_revoked: bool,
}

/// Returned by `forgot_password`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForgotPasswordResponse {
    pub message: String,
}

impl ForgotPasswordResponse {
    pub fn generic() -> Self {
        Self {
            message: FORGOT_PASSWORD_MESSAGE.to_string(),
        }
    }
}
