//! Refresh token rotation and revocation

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::token::{
    Claims, RefreshTokenRecord, RevocationReason, TokenKind, TokenPair, TokenStatistics,
};
use crate::errors::{AuthError, DomainResult, TokenError};
use crate::repositories::{CredentialStore, TokenLedger};
use crate::services::guard::{bounded, conceal};
use crate::services::revocation::RevocationRegistry;
use crate::services::session::SessionTracker;

use super::issuer::{hash_token, TokenIssuer};

/// Orchestrates validation, rotation and revocation of refresh tokens.
///
/// A refresh token lineage moves `ISSUED -> USED_FOR_ROTATION -> ISSUED'`
/// until it is revoked. Each refresh token rotates at most once: the
/// ledger's compare-and-set on the revoked flag picks a single winner when
/// the same token is presented concurrently.
///
/// The ledger is authoritative for refresh tokens. The registry is a fast
/// path that additionally blocks access tokens for their remaining lifetime.
pub struct TokenRotationService<L, C>
where
    L: TokenLedger,
    C: CredentialStore,
{
    issuer: Arc<TokenIssuer>,
    ledger: Arc<L>,
    credentials: Arc<C>,
    registry: Arc<RevocationRegistry>,
    sessions: Arc<SessionTracker>,
}

impl<L, C> TokenRotationService<L, C>
where
    L: TokenLedger,
    C: CredentialStore,
{
    pub fn new(
        issuer: Arc<TokenIssuer>,
        ledger: Arc<L>,
        credentials: Arc<C>,
        registry: Arc<RevocationRegistry>,
        sessions: Arc<SessionTracker>,
    ) -> Self {
        Self {
            issuer,
            ledger,
            credentials,
            registry,
            sessions,
        }
    }

    pub fn issuer(&self) -> &Arc<TokenIssuer> {
        &self.issuer
    }

    pub fn registry(&self) -> &Arc<RevocationRegistry> {
        &self.registry
    }

    pub fn sessions(&self) -> &Arc<SessionTracker> {
        &self.sessions
    }

    fn now(&self) -> DateTime<Utc> {
        self.issuer.clock().now()
    }

    async fn ledger_call<T, F>(&self, operation: &'static str, call: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        bounded(self.issuer.config().ledger_timeout, operation, call).await
    }

    /// Mint a new pair for `user_id`, revoking `old_refresh_token` first.
    ///
    /// # Returns
    /// * `Ok(TokenPair)` - The new pair, persisted to the ledger
    /// * `Err(TokenError::InvalidToken)` - The old token does not decode
    /// * `Err(TokenError::TokenRevoked)` - Another caller already revoked the old token
    pub async fn generate_pair(
        &self,
        user_id: Uuid,
        old_refresh_token: Option<&str>,
    ) -> DomainResult<TokenPair> {
        let rotated_from = match old_refresh_token {
            Some(old) => {
                let claims = self.issuer.verify_allow_expired(old, TokenKind::Refresh)?;
                if !self.revoke_claims(&claims, RevocationReason::Rotation).await? {
                    return Err(TokenError::TokenRevoked.into());
                }
                Some(claims.jti)
            }
            None => None,
        };

        let issued = self.issuer.issue_pair(user_id)?;
        let record = RefreshTokenRecord::new(
            issued.refresh_claims.jti.clone(),
            user_id,
            hash_token(&issued.pair.refresh_token),
            self.now(),
            issued.refresh_claims.expires_at(),
        );
        self.ledger_call("ledger.insert", self.ledger.insert(record))
            .await?;

        info!(
            user_id = %user_id,
            jti = %issued.refresh_claims.jti,
            rotated_from = rotated_from.as_deref().unwrap_or("-"),
            "Token pair issued"
        );
        Ok(issued.pair)
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// Every security failure surfaces as `AuthError::Unauthorized`; the
    /// specific reason is logged. Infrastructure failures pass through.
    pub async fn rotate(&self, presented: &str, ip_address: Option<&str>) -> DomainResult<TokenPair> {
        self.try_rotate(presented, ip_address)
            .await
            .map_err(|e| conceal("rotate", e))
    }

    async fn try_rotate(&self, presented: &str, ip_address: Option<&str>) -> DomainResult<TokenPair> {
        let claims = self.issuer.verify(presented, TokenKind::Refresh)?;

        if self.registry.is_revoked(&claims.jti) {
            return Err(TokenError::TokenRevoked.into());
        }

        let record = self
            .ledger_call("ledger.find_by_id", self.ledger.find_by_id(&claims.jti))
            .await?
            .filter(|record| !record.is_revoked)
            .ok_or(TokenError::TokenRevoked)?;

        let user_id = claims.user_id().map_err(|_| TokenError::InvalidToken)?;
        let presented_hash = hash_token(presented);
        if record.user_id != user_id
            || !constant_time_eq(record.token_hash.as_bytes(), presented_hash.as_bytes())
        {
            return Err(TokenError::InvalidToken.into());
        }

        let user = self
            .ledger_call("credentials.find_by_id", self.credentials.find_by_id(user_id))
            .await?;
        if !user.map(|u| u.is_active).unwrap_or(false) {
            return Err(AuthError::UserInactive.into());
        }

        if !self.sessions.is_active(user_id) {
            return Err(AuthError::SessionExpired.into());
        }

        self.ledger_call(
            "ledger.touch_last_used",
            self.ledger.touch_last_used(&claims.jti, self.now()),
        )
        .await?;

        let pair = self.generate_pair(user_id, Some(presented)).await?;

        self.sessions.touch(user_id);
        self.sessions.replace_tokens(
            user_id,
            presented,
            pair.access_token.clone(),
            pair.refresh_token.clone(),
        );

        info!(
            user_id = %user_id,
            ip = ip_address.unwrap_or("unknown"),
            "Refresh token rotated"
        );
        Ok(pair)
    }

    /// Add to the registry, then flip the ledger flag.
    ///
    /// Returns whether this call was the one that revoked the ledger record.
    async fn revoke_claims(&self, claims: &Claims, reason: RevocationReason) -> DomainResult<bool> {
        self.registry.revoke(&claims.jti, claims.expires_at(), reason);
        self.ledger_call(
            "ledger.mark_revoked",
            self.ledger.mark_revoked(&claims.jti, reason, self.now()),
        )
        .await
    }

    /// Revoke a single refresh token, tolerating expiry.
    ///
    /// # Returns
    /// * `Ok(false)` - The token does not decode; nothing to do
    /// * `Ok(true)` - The token is now revoked in the registry and the ledger
    pub async fn revoke(&self, refresh_token: &str, reason: RevocationReason) -> DomainResult<bool> {
        let claims = match self.issuer.verify_allow_expired(refresh_token, TokenKind::Refresh) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Skipping revocation of undecodable refresh token");
                return Ok(false);
            }
        };

        let first = self.revoke_claims(&claims, reason).await?;
        info!(jti = %claims.jti, reason = %reason, first, "Refresh token revoked");
        Ok(true)
    }

    /// Blacklist an access token for the rest of its lifetime.
    ///
    /// Returns `false` if the token does not verify.
    pub fn revoke_access_token(&self, access_token: &str, reason: RevocationReason) -> bool {
        match self.issuer.verify_allow_expired(access_token, TokenKind::Access) {
            Ok(claims) => {
                self.registry.revoke(&claims.jti, claims.expires_at(), reason);
                true
            }
            Err(e) => {
                debug!(error = %e, "Skipping revocation of undecodable access token");
                false
            }
        }
    }

    /// Revoke every refresh token of a user.
    ///
    /// Unexpired tokens go to the registry and are counted; then every
    /// non-revoked ledger row is marked revoked, whether or not it reached
    /// the registry.
    pub async fn revoke_all_for_user(&self, user_id: Uuid, reason: RevocationReason) -> DomainResult<usize> {
        let now = self.now();
        let records = self
            .ledger_call("ledger.find_active_by_user", self.ledger.find_active_by_user(user_id))
            .await?;

        let mut revoked = 0;
        for record in records.iter().filter(|r| !r.is_expired_at(now)) {
            self.registry.revoke(&record.id, record.expires_at, reason);
            revoked += 1;
        }

        let marked = self
            .ledger_call(
                "ledger.mark_all_revoked_for_user",
                self.ledger.mark_all_revoked_for_user(user_id, reason, now),
            )
            .await?;

        info!(
            user_id = %user_id,
            reason = %reason,
            revoked,
            ledger_rows = marked,
            "Revoked all refresh tokens for user"
        );
        Ok(revoked)
    }

    /// Verify an access token and check it against the registry
    pub fn verify_access_token(&self, access_token: &str) -> DomainResult<Claims> {
        let claims = self.issuer.verify(access_token, TokenKind::Access)?;
        if self.registry.is_revoked(&claims.jti) {
            warn!(jti = %claims.jti, "Revoked access token presented");
            return Err(TokenError::TokenRevoked.into());
        }
        Ok(claims)
    }

    /// Ledger row counts for dashboards
    pub async fn statistics(&self) -> DomainResult<TokenStatistics> {
        self.ledger_call("ledger.stats", self.ledger.stats(self.now()))
            .await
    }

    /// Delete ledger rows that expired more than `grace` ago.
    ///
    /// A negative grace is treated as zero; the cutoff never passes `now`.
    pub async fn purge_expired(&self, grace: Duration) -> DomainResult<usize> {
        let cutoff = self.now() - grace.max(Duration::zero());
        self.ledger_call("ledger.delete_expired", self.ledger.delete_expired(cutoff))
            .await
    }
}
