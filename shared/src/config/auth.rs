//! Authentication, token and session configuration

use serde::{Deserialize, Serialize};

use super::vars;

const DEFAULT_ACCESS_SECRET: &str = "development-access-secret-change-in-production";
const DEFAULT_REFRESH_SECRET: &str = "development-refresh-secret-change-in-production";
const DEFAULT_RESET_SECRET: &str = "development-reset-secret-change-in-production";

/// JWT signing and ledger access configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret for signing access tokens
    pub access_secret: String,

    /// Secret for signing refresh tokens; must differ from the access secret
    pub refresh_secret: String,

    /// Secret for signing password reset tokens
    pub reset_secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Upper bound for a single token ledger call, in milliseconds
    #[serde(default = "default_ledger_timeout_ms")]
    pub ledger_timeout_ms: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::from(DEFAULT_ACCESS_SECRET),
            refresh_secret: String::from(DEFAULT_REFRESH_SECRET),
            reset_secret: String::from(DEFAULT_RESET_SECRET),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            issuer: String::from("changegate"),
            audience: String::from("changegate-api"),
            ledger_timeout_ms: default_ledger_timeout_ms(),
        }
    }
}

impl JwtConfig {
    /// Create a JWT configuration with explicit secrets
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        reset_secret: impl Into<String>,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            reset_secret: reset_secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if any of the built-in development secrets is still in use
    pub fn uses_default_secrets(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET
            || self.refresh_secret == DEFAULT_REFRESH_SECRET
            || self.reset_secret == DEFAULT_RESET_SECRET
    }
}

/// Session inactivity configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Idle time in seconds after which a session becomes inactive
    pub inactivity_timeout: i64,

    /// Interval in seconds between background session sweeps
    pub sweep_interval: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: 1800, // 30 minutes
            sweep_interval: 60,
        }
    }
}

/// Revocation registry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevocationConfig {
    /// Interval in seconds between sweeps of expired registry entries
    pub sweep_interval: u64,
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self { sweep_interval: 300 }
    }
}

/// Password reset configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasswordResetConfig {
    /// Reset token lifetime in seconds
    pub token_expiry: i64,

    /// Minimum accepted length for a new secret
    pub min_secret_length: usize,

    /// bcrypt cost used when hashing new secrets
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for PasswordResetConfig {
    fn default() -> Self {
        Self {
            token_expiry: 3600, // 1 hour
            min_secret_length: 8,
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

/// Refresh token ledger maintenance configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,

    /// Grace period after expiry before deletion (in days)
    pub grace_period_days: i64,

    /// Whether to run the maintenance loop at all
    pub enabled: bool,
}

impl Default for LedgerCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            grace_period_days: 7,
            enabled: true,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Revocation registry configuration
    #[serde(default)]
    pub revocation: RevocationConfig,

    /// Password reset configuration
    #[serde(default)]
    pub password_reset: PasswordResetConfig,

    /// Ledger maintenance configuration
    #[serde(default)]
    pub ledger_cleanup: LedgerCleanupConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = JwtConfig::default();
        let jwt = JwtConfig {
            access_secret: vars::string("JWT_ACCESS_SECRET", defaults.access_secret),
            refresh_secret: vars::string("JWT_REFRESH_SECRET", defaults.refresh_secret),
            reset_secret: vars::string("JWT_RESET_SECRET", defaults.reset_secret),
            access_token_expiry: vars::parse("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: vars::parse("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
            issuer: vars::string("JWT_ISSUER", defaults.issuer),
            audience: vars::string("JWT_AUDIENCE", defaults.audience),
            ledger_timeout_ms: vars::parse("TOKEN_LEDGER_TIMEOUT_MS", defaults.ledger_timeout_ms),
        };

        let session = SessionConfig {
            inactivity_timeout: vars::parse("SESSION_INACTIVITY_TIMEOUT", 1800),
            sweep_interval: vars::parse("SESSION_SWEEP_INTERVAL", 60),
        };

        Self {
            jwt,
            session,
            revocation: RevocationConfig {
                sweep_interval: vars::parse("REVOCATION_SWEEP_INTERVAL", 300),
            },
            password_reset: PasswordResetConfig {
                token_expiry: vars::parse("PASSWORD_RESET_EXPIRY", 3600),
                ..Default::default()
            },
            ledger_cleanup: LedgerCleanupConfig::default(),
        }
    }

    /// Check the invariants the token core relies on
    pub fn validate(&self) -> Result<(), String> {
        let jwt = &self.jwt;
        if jwt.access_secret == jwt.refresh_secret
            || jwt.access_secret == jwt.reset_secret
            || jwt.refresh_secret == jwt.reset_secret
        {
            return Err("access, refresh and reset secrets must be distinct".to_string());
        }
        if jwt.access_token_expiry <= 0 || jwt.refresh_token_expiry <= 0 {
            return Err("token expiries must be positive".to_string());
        }
        if self.session.inactivity_timeout <= 0 {
            return Err("session inactivity timeout must be positive".to_string());
        }
        if self.session.sweep_interval == 0 || self.revocation.sweep_interval == 0 {
            return Err("sweep intervals must be non-zero".to_string());
        }
        if jwt.ledger_timeout_ms == 0 {
            return Err("ledger timeout must be non-zero".to_string());
        }
        if self.password_reset.token_expiry <= 0 {
            return Err("password reset expiry must be positive".to_string());
        }
        let cleanup = &self.ledger_cleanup;
        // A negative grace period would move the purge cutoff past live rows
        if cleanup.grace_period_days < 0 {
            return Err("ledger cleanup grace period must not be negative".to_string());
        }
        if cleanup.enabled && cleanup.interval_seconds == 0 {
            return Err("ledger cleanup interval must be non-zero".to_string());
        }
        Ok(())
    }
}

fn default_ledger_timeout_ms() -> u64 {
    3000
}

fn default_bcrypt_cost() -> u32 {
    12
}
