//! Configuration for token issuance and the rotation service

use cg_shared::config::{JwtConfig, PasswordResetConfig};
use chrono::Duration;

use crate::domain::entities::token::{
    ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_DAYS, RESET_TOKEN_EXPIRY_MINUTES,
};

/// Claim values and lifetimes for issued tokens
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT issuer claim
    pub issuer: String,
    /// JWT audience claim
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Lifetime of single-purpose password reset tokens
    pub reset_ttl: Duration,
    /// Upper bound for a single ledger call
    pub ledger_timeout: std::time::Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            issuer: "changegate".to_string(),
            audience: "changegate-api".to_string(),
            access_ttl: Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES),
            refresh_ttl: Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
            reset_ttl: Duration::minutes(RESET_TOKEN_EXPIRY_MINUTES),
            ledger_timeout: std::time::Duration::from_secs(3),
        }
    }
}

impl TokenServiceConfig {
    pub fn from_config(jwt: &JwtConfig, reset: &PasswordResetConfig) -> Self {
        Self {
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            access_ttl: Duration::seconds(jwt.access_token_expiry),
            refresh_ttl: Duration::seconds(jwt.refresh_token_expiry),
            reset_ttl: Duration::seconds(reset.token_expiry),
            ledger_timeout: std::time::Duration::from_millis(jwt.ledger_timeout_ms),
        }
    }
}
