//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Signing and verification with per-kind secrets
//! - Access/refresh pair and password reset token issuance
//! - Refresh token rotation and revocation against the ledger
//! - Background cleanup of expired ledger rows

mod cleanup;
mod config;
mod issuer;
mod rotation;
mod signer;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use config::TokenServiceConfig;
pub use issuer::{hash_token, IssuedPair, TokenIssuer};
pub use rotation::TokenRotationService;
pub use signer::{JwtSigner, TokenSigner};
