//! Token entities for JWT-based authentication.

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token expiration time (15 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Refresh token expiration time (7 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Password reset token expiration time (1 hour)
pub const RESET_TOKEN_EXPIRY_MINUTES: i64 = 60;

/// `purpose` claim carried by password reset tokens
pub const PASSWORD_RESET_PURPOSE: &str = "password-reset";

/// Discriminates what a signed token may be used for.
///
/// Each kind is signed with its own secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
    Reset,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::Reset => "reset",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID, primary key in the ledger and the revocation registry
    pub jti: String,

    /// Token type discriminant
    pub token_type: TokenKind,

    /// Single-purpose marker, set on password reset tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl Claims {
    /// Creates claims for a freshly minted token of the given kind
    pub fn new(
        user_id: Uuid,
        kind: TokenKind,
        issuer: &str,
        audience: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let expiry = issued_at + ttl;

        Self {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expiry.timestamp(),
            nbf: issued_at.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
            token_type: kind,
            purpose: None,
        }
    }

    /// Sets the `purpose` claim
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Checks whether the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Checks whether the claims are inside their validity window at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let now = now.timestamp();
        now >= self.nbf && now < self.exp
    }
}

/// Why a token was revoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    Rotation,
    Logout,
    LogoutAll,
    PasswordReset,
    ForceLogout,
}

impl RevocationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationReason::Rotation => "rotation",
            RevocationReason::Logout => "logout",
            RevocationReason::LogoutAll => "logout_all",
            RevocationReason::PasswordReset => "password_reset",
            RevocationReason::ForceLogout => "force_logout",
        }
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RevocationReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rotation" => Ok(RevocationReason::Rotation),
            "logout" => Ok(RevocationReason::Logout),
            "logout_all" => Ok(RevocationReason::LogoutAll),
            "password_reset" => Ok(RevocationReason::PasswordReset),
            "force_logout" => Ok(RevocationReason::ForceLogout),
            other => Err(format!("Unknown revocation reason: {}", other)),
        }
    }
}

/// Refresh token record persisted in the durable ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// The refresh token's `jti`
    pub id: String,

    /// User ID this token belongs to
    pub user_id: Uuid,

    /// SHA-256 hex digest of the token value
    pub token_hash: String,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Timestamp of the last successful rotation check
    pub last_used_at: Option<DateTime<Utc>>,

    /// Whether the token has been revoked
    pub is_revoked: bool,

    /// Timestamp of revocation
    pub revoked_at: Option<DateTime<Utc>>,

    /// Why the token was revoked
    pub revoked_reason: Option<RevocationReason>,
}

impl RefreshTokenRecord {
    /// Creates a new, unrevoked record
    pub fn new(
        id: impl Into<String>,
        user_id: Uuid,
        token_hash: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id,
            token_hash,
            created_at,
            expires_at,
            last_used_at: None,
            is_revoked: false,
            revoked_at: None,
            revoked_reason: None,
        }
    }

    /// Checks if the record has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// A record is usable if it has neither expired nor been revoked
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now) && !self.is_revoked
    }

    /// Revokes the record. Revocation happens once: returns `false` and
    /// leaves the original reason untouched if already revoked.
    pub fn revoke(&mut self, reason: RevocationReason, at: DateTime<Utc>) -> bool {
        if self.is_revoked {
            return false;
        }
        self.is_revoked = true;
        self.revoked_at = Some(at);
        self.revoked_reason = Some(reason);
        true
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}

/// Ledger row counts for operational dashboards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStatistics {
    pub total: u64,
    /// Neither revoked nor expired
    pub active: u64,
    pub revoked: u64,
    /// Expired but never revoked
    pub expired: u64,
}
