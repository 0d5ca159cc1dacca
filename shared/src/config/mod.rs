//! Configuration module with business-specific sub-modules
//!
//! - `auth` - Token signing, session inactivity, revocation and reset settings
//! - `database` - Database connection and pool configuration
//! - `runtime` - Deployment environment and logging configuration

pub mod auth;
pub mod database;
pub mod runtime;
mod vars;

use std::path::Path;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::{
    AuthConfig, JwtConfig, LedgerCleanupConfig, PasswordResetConfig, RevocationConfig,
    SessionConfig,
};
pub use database::DatabaseConfig;
pub use runtime::{Environment, LogFormat, LoggingConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Check every section, and refuse the built-in JWT secrets outside
    /// development
    pub fn validate(&self) -> Result<(), String> {
        self.auth.validate()?;
        self.database.validate()?;
        if self.auth.jwt.uses_default_secrets() && !self.environment.allows_default_secrets() {
            return Err(format!(
                "JWT secrets are the built-in defaults; set JWT_*_SECRET for {}",
                self.environment.as_str()
            ));
        }
        Ok(())
    }

    /// Load configuration layered as: environment defaults, then the optional
    /// TOML file at `path`, then `CHANGEGATE__*` variables
    /// (e.g. `CHANGEGATE__AUTH__SESSION__INACTIVITY_TIMEOUT=600`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let base = Self::from_env();

        config::Config::builder()
            .add_source(config::Config::try_from(&base)?)
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CHANGEGATE").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Load the `.env` file for the detected environment, falling back to `.env`
    pub fn load_dotenv() {
        let env = Environment::from_env();
        if dotenvy::from_filename(env.env_file()).is_err() {
            dotenvy::dotenv().ok();
        }
    }
}
