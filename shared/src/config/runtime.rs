//! Deployment environment and log output settings

use serde::{Deserialize, Serialize};

use super::vars;

/// Deployment the process runs in; selects config files, log defaults and
/// whether the built-in development secrets are tolerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Read `CHANGEGATE_ENV`, falling back to development
    pub fn from_env() -> Self {
        vars::string("CHANGEGATE_ENV", "development")
            .parse()
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Layered TOML file read by `AppConfig::load`
    pub fn config_file(&self) -> String {
        format!("config/changegate.{}.toml", self.as_str())
    }

    /// Dotenv file read by `AppConfig::load_dotenv`
    pub fn env_file(&self) -> String {
        format!(".env.{}", self.as_str())
    }

    /// Only local development may sign tokens with the built-in secrets
    pub fn allows_default_secrets(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("Unknown environment: {}", other)),
        }
    }
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

/// Tracing subscriber settings. `RUST_LOG` still wins over `level`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Level or full filter directive, e.g. `info` or `cg_core=debug,info`
    pub level: String,

    pub format: LogFormat,

    /// Include file and line in every event
    #[serde(default)]
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl LoggingConfig {
    /// Human-readable debug output locally, JSON info everywhere else
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: String::from("debug"),
                format: LogFormat::Pretty,
                source_location: true,
            },
            Environment::Staging | Environment::Production => Self {
                level: String::from("info"),
                format: LogFormat::Json,
                source_location: false,
            },
        }
    }

    /// Environment defaults with `LOG_LEVEL` / `LOG_FORMAT` overrides
    pub fn from_env(env: Environment) -> Self {
        let defaults = Self::for_environment(env);
        Self {
            level: vars::string("LOG_LEVEL", defaults.level),
            format: match vars::string("LOG_FORMAT", "").to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                "compact" => LogFormat::Compact,
                _ => defaults.format,
            },
            source_location: defaults.source_location,
        }
    }

    /// Filter directive for the subscriber.
    ///
    /// A bare level keeps SQLx statement logging at `warn` so per-query
    /// debug lines do not drown the auth events; a full directive is used
    /// as given.
    pub fn filter_directive(&self) -> String {
        if self.level.contains(',') || self.level.contains('=') {
            self.level.clone()
        } else {
            format!("{},sqlx=warn", self.level)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_str() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("Production".parse::<Environment>().unwrap(), Environment::Production);
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_files() {
        let staging = Environment::Staging;
        assert_eq!(staging.config_file(), "config/changegate.staging.toml");
        assert_eq!(staging.env_file(), ".env.staging");
    }

    #[test]
    fn test_default_secrets_only_in_development() {
        assert!(Environment::Development.allows_default_secrets());
        assert!(!Environment::Staging.allows_default_secrets());
        assert!(!Environment::Production.allows_default_secrets());
    }

    #[test]
    fn test_filter_directive() {
        let mut logging = LoggingConfig::for_environment(Environment::Production);
        assert_eq!(logging.filter_directive(), "info,sqlx=warn");

        logging.level = "cg_core=trace,info".to_string();
        assert_eq!(logging.filter_directive(), "cg_core=trace,info");
    }
}
