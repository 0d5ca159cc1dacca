//! Token issuance and clock-aware verification

use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::token::{Claims, TokenKind, TokenPair, PASSWORD_RESET_PURPOSE};
use crate::errors::{DomainResult, TokenError};
use crate::services::clock::Clock;

use super::config::TokenServiceConfig;
use super::signer::TokenSigner;

/// A freshly minted pair together with the claims it was signed from
#[derive(Debug, Clone)]
pub struct IssuedPair {
    pub pair: TokenPair,
    pub access_claims: Claims,
    pub refresh_claims: Claims,
}

/// Mints signed tokens and verifies them against the injected clock
pub struct TokenIssuer {
    signer: Arc<dyn TokenSigner>,
    clock: Arc<dyn Clock>,
    config: TokenServiceConfig,
}

impl TokenIssuer {
    pub fn new(signer: Arc<dyn TokenSigner>, clock: Arc<dyn Clock>, config: TokenServiceConfig) -> Self {
        Self { signer, clock, config }
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn claims(&self, user_id: Uuid, kind: TokenKind, ttl: chrono::Duration) -> Claims {
        Claims::new(
            user_id,
            kind,
            &self.config.issuer,
            &self.config.audience,
            self.clock.now(),
            ttl,
        )
    }

    /// Mint an access token and a refresh token for `user_id`
    pub fn issue_pair(&self, user_id: Uuid) -> DomainResult<IssuedPair> {
        let access_claims = self.claims(user_id, TokenKind::Access, self.config.access_ttl);
        let refresh_claims = self.claims(user_id, TokenKind::Refresh, self.config.refresh_ttl);

        let pair = TokenPair {
            access_token: self.signer.sign(&access_claims)?,
            refresh_token: self.signer.sign(&refresh_claims)?,
            access_expires_in: self.config.access_ttl.num_seconds(),
            refresh_expires_in: self.config.refresh_ttl.num_seconds(),
        };

        Ok(IssuedPair {
            pair,
            access_claims,
            refresh_claims,
        })
    }

    /// Mint a single-purpose password reset token
    pub fn issue_password_reset(&self, user_id: Uuid) -> DomainResult<(String, Claims)> {
        let claims = self
            .claims(user_id, TokenKind::Reset, self.config.reset_ttl)
            .with_purpose(PASSWORD_RESET_PURPOSE);
        let token = self.signer.sign(&claims)?;
        Ok((token, claims))
    }

    /// Verify signature, kind and validity window
    pub fn verify(&self, token: &str, kind: TokenKind) -> DomainResult<Claims> {
        let claims = self.signer.verify(token, kind)?;
        let now = self.clock.now();

        if claims.is_expired_at(now) {
            return Err(TokenError::TokenExpired.into());
        }
        if !claims.is_valid_at(now) {
            return Err(TokenError::InvalidToken.into());
        }
        Ok(claims)
    }

    /// Verify signature and kind, accepting tokens past their expiry
    pub fn verify_allow_expired(&self, token: &str, kind: TokenKind) -> DomainResult<Claims> {
        self.signer.verify(token, kind)
    }

    pub fn decode_unsafe(&self, token: &str) -> Option<Claims> {
        self.signer.decode_unsafe(token)
    }
}

/// SHA-256 hex digest of a token value, as stored in the ledgers
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
