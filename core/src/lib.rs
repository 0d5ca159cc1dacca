//! # ChangeGate Core
//!
//! Credential, token and session lifecycle for the ChangeGate server.
//! This crate contains domain entities, the auth services, the repository
//! interfaces they consume, and error types.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::entities::{
    Claims, CredentialRecord, NewCredential, PasswordResetToken, RefreshTokenRecord,
    RevocationReason, Role, SessionInfo, SessionStats, TokenKind, TokenPair, TokenStatistics,
};
pub use domain::value_objects::{ForgotPasswordResponse, LoginResponse, LogoutResult, UserSummary};
pub use errors::{AuthError, DomainError, DomainResult, TokenError};
pub use repositories::{CredentialStore, PasswordResetLedger, TokenLedger};
pub use services::{
    AuthService, AuthServiceConfig, Clock, JwtSigner, NoOpPasswordResetNotifier,
    PasswordResetNotifier, RevocationRegistry, SessionTracker, SystemClock, TokenCleanupConfig,
    TokenCleanupService, TokenIssuer, TokenRotationService, TokenServiceConfig, TokenSigner,
};
