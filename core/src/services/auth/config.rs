//! Configuration for the authentication service

use cg_shared::config::PasswordResetConfig;

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Whether to allow registration of new users
    pub allow_registration: bool,
    /// Minimum accepted secret length
    pub min_secret_length: usize,
    /// bcrypt cost for new secret hashes
    pub bcrypt_cost: u32,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            allow_registration: true,
            min_secret_length: 8,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl From<&PasswordResetConfig> for AuthServiceConfig {
    fn from(config: &PasswordResetConfig) -> Self {
        Self {
            min_secret_length: config.min_secret_length,
            bcrypt_cost: config.bcrypt_cost,
            ..Self::default()
        }
    }
}
