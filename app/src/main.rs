//! ChangeGate auth core process host.
//!
//! Loads configuration, connects to MySQL, wires the auth services and runs
//! the background sweeps until interrupted.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cg_core::services::{
    AuthService, AuthServiceConfig, Clock, JwtSigner, RevocationRegistry, SessionTracker,
    SystemClock, TokenCleanupConfig, TokenCleanupService, TokenIssuer, TokenRotationService,
    TokenServiceConfig, TokenSigner,
};
use cg_infra::{DatabasePool, MySqlCredentialStore, MySqlPasswordResetLedger, MySqlTokenLedger};
use cg_shared::config::{AppConfig, LogFormat, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    AppConfig::load_dotenv();

    let config_path = std::env::var("CHANGEGATE_CONFIG")
        .unwrap_or_else(|_| cg_shared::Environment::from_env().config_file());
    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}; using environment only", config_path, e);
            AppConfig::from_env()
        }
    };

    init_tracing(&config.logging);

    info!(
        environment = ?config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting ChangeGate auth core"
    );

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;
    if config.auth.jwt.uses_default_secrets() {
        warn!("JWT secrets are the built-in development defaults; set JWT_*_SECRET before deploying");
    }

    let database = DatabasePool::new(&config.database)
        .await
        .context("Failed to connect to the database")?;
    database
        .run_migrations()
        .await
        .context("Failed to apply database migrations")?;

    let pool = database.get_pool().clone();
    let credentials = Arc::new(MySqlCredentialStore::new(pool.clone()));
    let token_ledger = Arc::new(MySqlTokenLedger::new(pool.clone()));
    let reset_ledger = Arc::new(MySqlPasswordResetLedger::new(pool));

    let auth = &config.auth;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let signer: Arc<dyn TokenSigner> = Arc::new(JwtSigner::new(&auth.jwt));
    let issuer = Arc::new(TokenIssuer::new(
        signer,
        clock.clone(),
        TokenServiceConfig::from_config(&auth.jwt, &auth.password_reset),
    ));
    let registry = Arc::new(RevocationRegistry::new(
        clock.clone(),
        std::time::Duration::from_secs(auth.revocation.sweep_interval),
    ));
    let sessions = Arc::new(SessionTracker::new(
        clock,
        chrono::Duration::seconds(auth.session.inactivity_timeout),
        std::time::Duration::from_secs(auth.session.sweep_interval),
    ));
    let rotation = Arc::new(TokenRotationService::new(
        issuer,
        token_ledger,
        credentials.clone(),
        registry,
        sessions,
    ));
    let auth_service = AuthService::new(
        credentials,
        reset_ledger,
        rotation.clone(),
        AuthServiceConfig::from(&auth.password_reset),
    );
    let cleanup = Arc::new(TokenCleanupService::new(
        rotation,
        TokenCleanupConfig::from(&auth.ledger_cleanup),
    ));

    auth_service.start_background_tasks();
    cleanup.start();

    info!(pool = %database.get_statistics(), "Auth core ready");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutdown signal received");

    let logged_out = auth_service.force_logout_all_sessions("server shutdown");
    info!(sessions = logged_out, "Cleared active sessions");

    cleanup.stop().await;
    auth_service.stop_background_tasks().await;
    database.close().await;

    info!("ChangeGate auth core stopped");
    Ok(())
}

/// Install the global tracing subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(logging.source_location)
        .with_line_number(logging.source_location);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}
