//! JWT signing with a distinct secret per token kind

use cg_shared::config::JwtConfig;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, error};

use crate::domain::entities::token::{Claims, TokenKind};
use crate::errors::{DomainResult, TokenError};

/// Signs and verifies tokens.
///
/// `verify` checks signature, issuer, audience and token kind but not
/// expiry; callers compare `exp` against their own clock.
pub trait TokenSigner: Send + Sync {
    /// Sign `claims` with the key for `claims.token_type`
    fn sign(&self, claims: &Claims) -> DomainResult<String>;

    fn verify(&self, token: &str, kind: TokenKind) -> DomainResult<Claims>;

    /// Decode without any signature or claim checks
    fn decode_unsafe(&self, token: &str) -> Option<Claims>;
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// HS256 signer keyed by token kind, so an access token can never be
/// replayed as a refresh or reset token.
pub struct JwtSigner {
    access: SigningKey,
    refresh: SigningKey,
    reset: SigningKey,
    validation: Validation,
    unchecked: Validation,
}

impl JwtSigner {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_exp = false;
        validation.validate_nbf = false;

        let mut unchecked = Validation::new(Algorithm::HS256);
        unchecked.insecure_disable_signature_validation();
        unchecked.validate_exp = false;
        unchecked.validate_aud = false;
        unchecked.required_spec_claims.clear();

        Self {
            access: SigningKey::from_secret(&config.access_secret),
            refresh: SigningKey::from_secret(&config.refresh_secret),
            reset: SigningKey::from_secret(&config.reset_secret),
            validation,
            unchecked,
        }
    }

    fn key(&self, kind: TokenKind) -> &SigningKey {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
            TokenKind::Reset => &self.reset,
        }
    }
}

impl TokenSigner for JwtSigner {
    fn sign(&self, claims: &Claims) -> DomainResult<String> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, &self.key(claims.token_type).encoding).map_err(|e| {
            error!(error = %e, kind = %claims.token_type, "Failed to sign token");
            TokenError::TokenGenerationFailed.into()
        })
    }

    fn verify(&self, token: &str, kind: TokenKind) -> DomainResult<Claims> {
        let data = decode::<Claims>(token, &self.key(kind).decoding, &self.validation).map_err(|e| {
            debug!(error = %e, kind = %kind, "Token verification failed");
            TokenError::InvalidToken
        })?;

        if data.claims.token_type != kind {
            debug!(expected = %kind, actual = %data.claims.token_type, "Token kind mismatch");
            return Err(TokenError::InvalidToken.into());
        }
        Ok(data.claims)
    }

    fn decode_unsafe(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &self.unchecked)
            .map(|data| data.claims)
            .ok()
    }
}
