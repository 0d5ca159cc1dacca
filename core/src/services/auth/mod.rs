//! Authentication service module
//!
//! This module provides the credential and session orchestrator:
//! - Login, registration and access token authentication
//! - Refresh token rotation
//! - Logout, logout-all and admin force logout
//! - Single-use password reset

mod config;
mod notifier;
mod password;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use notifier::{NoOpPasswordResetNotifier, PasswordResetNotifier};
pub use password::{hash_secret, validate_email, validate_secret, verify_secret};
pub use service::AuthService;
