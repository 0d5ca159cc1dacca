//! Main authentication service implementation

use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::entities::credential::{CredentialRecord, NewCredential};
use crate::domain::entities::password_reset::PasswordResetToken;
use crate::domain::entities::session::{SessionInfo, SessionStats};
use crate::domain::entities::token::{
    Claims, RevocationReason, TokenKind, TokenPair, TokenStatistics, PASSWORD_RESET_PURPOSE,
};
use crate::domain::value_objects::{ForgotPasswordResponse, LoginResponse, LogoutResult, UserSummary};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError};
use crate::repositories::{CredentialStore, PasswordResetLedger, TokenLedger};
use crate::services::guard::{bounded, conceal};
use crate::services::revocation::RevocationRegistry;
use crate::services::session::SessionTracker;
use crate::services::token::{hash_token, TokenRotationService};

use super::config::AuthServiceConfig;
use super::notifier::{NoOpPasswordResetNotifier, PasswordResetNotifier};
use super::password::{hash_secret, validate_email, validate_secret, verify_secret};

/// Credential and session orchestrator.
///
/// Entry point for login, logout, refresh and password reset. Token and
/// session verdicts are collapsed to `AuthError::Unauthorized` at this
/// boundary; infrastructure failures are reported as such and never as
/// credential errors.
pub struct AuthService<C, L, P, N = NoOpPasswordResetNotifier>
where
    C: CredentialStore,
    L: TokenLedger,
    P: PasswordResetLedger,
    N: PasswordResetNotifier,
{
    /// Credential store for user lookups
    credentials: Arc<C>,
    /// Durable store of password reset tokens
    reset_ledger: Arc<P>,
    /// Rotation service owning the issuer, registry and session tracker
    rotation: Arc<TokenRotationService<L, C>>,
    /// Delivery of password reset links
    notifier: Arc<N>,
    config: AuthServiceConfig,
    /// Hash verified on logins that fail before bcrypt would run
    decoy_hash: OnceCell<String>,
}

impl<C, L, P> AuthService<C, L, P, NoOpPasswordResetNotifier>
where
    C: CredentialStore,
    L: TokenLedger,
    P: PasswordResetLedger,
{
    /// Create an authentication service that does not deliver reset links
    pub fn new(
        credentials: Arc<C>,
        reset_ledger: Arc<P>,
        rotation: Arc<TokenRotationService<L, C>>,
        config: AuthServiceConfig,
    ) -> Self {
        Self::with_notifier(
            credentials,
            reset_ledger,
            rotation,
            Arc::new(NoOpPasswordResetNotifier),
            config,
        )
    }
}

impl<C, L, P, N> AuthService<C, L, P, N>
where
    C: CredentialStore,
    L: TokenLedger,
    P: PasswordResetLedger,
    N: PasswordResetNotifier,
{
    /// Create an authentication service with a reset link notifier
    pub fn with_notifier(
        credentials: Arc<C>,
        reset_ledger: Arc<P>,
        rotation: Arc<TokenRotationService<L, C>>,
        notifier: Arc<N>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            credentials,
            reset_ledger,
            rotation,
            notifier,
            config,
            decoy_hash: OnceCell::new(),
        }
    }

    pub fn rotation(&self) -> &Arc<TokenRotationService<L, C>> {
        &self.rotation
    }

    pub fn sessions(&self) -> &Arc<SessionTracker> {
        self.rotation.sessions()
    }

    pub fn registry(&self) -> &Arc<RevocationRegistry> {
        self.rotation.registry()
    }

    async fn store_call<T, F>(&self, operation: &'static str, call: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        bounded(self.rotation.issuer().config().ledger_timeout, operation, call).await
    }

    /// Spend one bcrypt verification so unknown and inactive identifiers
    /// take as long to reject as a wrong secret
    async fn verify_decoy(&self, secret: &str) -> DomainResult<()> {
        let cost = self.config.bcrypt_cost;
        let hash = self
            .decoy_hash
            .get_or_try_init(|| hash_secret("changegate-decoy-secret", cost))
            .await?;
        verify_secret(secret, hash).await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn decoy_hash(&self) -> Option<&str> {
        self.decoy_hash.get().map(String::as_str)
    }

    fn open_session(
        &self,
        user: &CredentialRecord,
        tokens: TokenPair,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> LoginResponse {
        let session = self.sessions().create_session(
            user.id,
            tokens.access_token.clone(),
            tokens.refresh_token.clone(),
            ip_address.map(str::to_string),
            user_agent.map(str::to_string),
        );

        LoginResponse {
            tokens,
            session,
            user: UserSummary::from(user),
        }
    }

    /// Authenticate with identifier and secret
    ///
    /// Unknown identifier, inactive account and wrong secret all fail with
    /// the same `InvalidCredentials`.
    ///
    /// # Returns
    /// * `Ok(LoginResponse)` - Token pair, new session and user summary
    /// * `Err(AuthError::InvalidCredentials)` - Authentication failed
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> DomainResult<LoginResponse> {
        let user = self
            .store_call(
                "credentials.find_by_identifier",
                self.credentials.find_by_identifier(identifier),
            )
            .await?;

        let user = match user {
            Some(user) if user.is_active => user,
            Some(user) => {
                self.verify_decoy(secret).await?;
                warn!(user_id = %user.id, reason = "inactive", "Login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
            None => {
                self.verify_decoy(secret).await?;
                warn!(reason = "unknown_identifier", "Login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !verify_secret(secret, &user.secret_hash).await? {
            warn!(user_id = %user.id, reason = "wrong_secret", "Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens = self.rotation.generate_pair(user.id, None).await?;
        let response = self.open_session(&user, tokens, ip_address, user_agent);

        info!(
            user_id = %user.id,
            ip = ip_address.unwrap_or("unknown"),
            "Login succeeded"
        );
        Ok(response)
    }

    /// Create a credential and sign the new user in
    ///
    /// # Returns
    /// * `Ok(LoginResponse)` - As for `login`
    /// * `Err(DomainError::Validation)` - Malformed email or short secret
    /// * `Err(AuthError::Conflict)` - Identifier or email already registered
    pub async fn register(
        &self,
        new_credential: NewCredential,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> DomainResult<LoginResponse> {
        if !self.config.allow_registration {
            return Err(DomainError::Validation {
                message: "Registration is disabled".to_string(),
            });
        }

        let identifier = new_credential.identifier.trim();
        if identifier.is_empty() {
            return Err(DomainError::Validation {
                message: "Identifier is required".to_string(),
            });
        }
        let email = new_credential.email.trim().to_lowercase();
        validate_email(&email)?;
        validate_secret(&new_credential.secret, self.config.min_secret_length)?;

        let secret_hash = hash_secret(&new_credential.secret, self.config.bcrypt_cost).await?;

        let mut record = CredentialRecord::new(
            identifier,
            email,
            secret_hash,
            new_credential.role,
            self.rotation.issuer().clock().now(),
        );
        record.tenant_id = new_credential.tenant_id;
        record.first_name = new_credential.first_name;
        record.last_name = new_credential.last_name;

        let user = self
            .store_call("credentials.create", self.credentials.create(record))
            .await?;

        let tokens = self.rotation.generate_pair(user.id, None).await?;
        let response = self.open_session(&user, tokens, ip_address, user_agent);

        info!(user_id = %user.id, role = %user.role.as_str(), "User registered");
        Ok(response)
    }

    /// Verify an access token for an ordinary request and record activity
    pub fn authenticate(&self, access_token: &str) -> DomainResult<Claims> {
        self.try_authenticate(access_token)
            .map_err(|e| conceal("authenticate", e))
    }

    fn try_authenticate(&self, access_token: &str) -> DomainResult<Claims> {
        let claims = self.rotation.verify_access_token(access_token)?;
        let user_id = claims.user_id().map_err(|_| TokenError::InvalidToken)?;

        if !self.sessions().touch(user_id) {
            return Err(AuthError::SessionExpired.into());
        }
        Ok(claims)
    }

    /// Exchange a refresh token for a new pair
    pub async fn refresh(&self, refresh_token: &str, ip_address: Option<&str>) -> DomainResult<TokenPair> {
        self.rotation.rotate(refresh_token, ip_address).await
    }

    /// End the user's session
    ///
    /// Tokens that are missing fall back to the ones held by the session.
    /// Already invalid tokens are skipped; only infrastructure failures are
    /// reported.
    pub async fn logout(
        &self,
        user_id: Uuid,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> DomainResult<LogoutResult> {
        let session = self.sessions().remove(user_id);

        let access_token = access_token
            .map(str::to_string)
            .or_else(|| session.as_ref().map(|s| s.access_token.clone()));
        let access_token_revoked = access_token
            .map(|token| self.rotation.revoke_access_token(&token, RevocationReason::Logout))
            .unwrap_or(false);

        let refresh_token = refresh_token
            .map(str::to_string)
            .or_else(|| session.map(|s| s.refresh_token));
        let refresh_token_revoked = match refresh_token {
            Some(token) => self.rotation.revoke(&token, RevocationReason::Logout).await?,
            None => false,
        };

        info!(
            user_id = %user_id,
            access_token_revoked,
            refresh_token_revoked,
            "User logged out"
        );
        Ok(LogoutResult {
            success: true,
            refresh_token_revoked,
            access_token_revoked,
        })
    }

    /// Terminate the session and revoke every refresh token of the user
    ///
    /// # Returns
    /// Number of live refresh tokens revoked
    pub async fn logout_all(&self, user_id: Uuid) -> DomainResult<usize> {
        self.terminate_user(user_id, RevocationReason::LogoutAll).await
    }

    /// Admin counterpart of `logout_all`; keeps the session visible as
    /// inactive instead of removing it
    pub async fn force_logout(&self, user_id: Uuid, reason: &str) -> DomainResult<usize> {
        if let Some(access) = self.sessions().current_access_token(user_id) {
            self.rotation
                .revoke_access_token(&access, RevocationReason::ForceLogout);
        }
        self.sessions().expire(user_id, reason);

        let revoked = self
            .rotation
            .revoke_all_for_user(user_id, RevocationReason::ForceLogout)
            .await?;

        warn!(user_id = %user_id, reason, revoked, "User force logged out");
        Ok(revoked)
    }

    /// Drop every tracked session
    pub fn force_logout_all_sessions(&self, reason: &str) -> usize {
        self.sessions().force_logout_all(reason)
    }

    async fn terminate_user(&self, user_id: Uuid, reason: RevocationReason) -> DomainResult<usize> {
        // The session goes first: without it no refresh token can rotate,
        // even if the ledger call below fails.
        if let Some(session) = self.sessions().remove(user_id) {
            self.rotation.revoke_access_token(&session.access_token, reason);
        }

        let revoked = self.rotation.revoke_all_for_user(user_id, reason).await?;
        info!(user_id = %user_id, reason = %reason, revoked, "All sessions terminated");
        Ok(revoked)
    }

    /// Start a password reset
    ///
    /// The response is identical whether or not the email belongs to an
    /// active account.
    pub async fn forgot_password(&self, email: &str) -> DomainResult<ForgotPasswordResponse> {
        let email = email.trim().to_lowercase();
        let user = self
            .store_call("credentials.find_by_email", self.credentials.find_by_email(&email))
            .await?;

        match user {
            Some(user) if user.is_active => {
                if let Err(e) = self.issue_reset_token(&user).await {
                    error!(user_id = %user.id, error = %e, "Failed to issue password reset token");
                }
            }
            _ => debug!("Password reset requested for unknown or inactive account"),
        }

        Ok(ForgotPasswordResponse::generic())
    }

    async fn issue_reset_token(&self, user: &CredentialRecord) -> DomainResult<()> {
        let (token, claims) = self.rotation.issuer().issue_password_reset(user.id)?;
        let now = self.rotation.issuer().clock().now();
        let expires_at = claims.expires_at();

        let superseded = self
            .store_call(
                "reset_ledger.invalidate_for_user",
                self.reset_ledger.invalidate_for_user(user.id, now),
            )
            .await?;

        let record = PasswordResetToken::new(user.id, hash_token(&token), now, expires_at);
        self.store_call("reset_ledger.insert", self.reset_ledger.insert(record))
            .await?;

        if let Err(e) = self.notifier.send_reset_link(user, &token, expires_at).await {
            error!(user_id = %user.id, error = %e, "Failed to deliver password reset link");
        }

        info!(user_id = %user.id, superseded, "Password reset token issued");
        Ok(())
    }

    /// Complete a password reset with a single-use token
    ///
    /// On success the new secret is stored, the token can never be used
    /// again, and every session and refresh token of the user is revoked.
    ///
    /// # Returns
    /// * `Err(DomainError::Validation)` - The new secret is too short
    /// * `Err(AuthError::Unauthorized)` - The token is invalid, used, superseded or revoked
    pub async fn reset_password(&self, token: &str, new_secret: &str) -> DomainResult<()> {
        validate_secret(new_secret, self.config.min_secret_length)?;
        self.try_reset_password(token, new_secret)
            .await
            .map_err(|e| conceal("reset_password", e))
    }

    async fn try_reset_password(&self, token: &str, new_secret: &str) -> DomainResult<()> {
        let issuer = self.rotation.issuer();

        if let Some(claims) = issuer.decode_unsafe(token) {
            if self.registry().is_revoked(&claims.jti) {
                return Err(TokenError::TokenRevoked.into());
            }
        }

        let claims = issuer.verify(token, TokenKind::Reset)?;
        if claims.purpose.as_deref() != Some(PASSWORD_RESET_PURPOSE) {
            return Err(TokenError::WrongPurpose.into());
        }
        let user_id = claims.user_id().map_err(|_| TokenError::InvalidToken)?;
        let now = issuer.clock().now();

        let record = self
            .store_call(
                "reset_ledger.find_usable",
                self.reset_ledger.find_usable(&hash_token(token), user_id, now),
            )
            .await?
            .ok_or(TokenError::TokenRevoked)?;

        let user = self
            .store_call("credentials.find_by_id", self.credentials.find_by_id(user_id))
            .await?
            .filter(|user| user.is_active)
            .ok_or(AuthError::UserInactive)?;

        let secret_hash = hash_secret(new_secret, self.config.bcrypt_cost).await?;

        // Consume before writing, so concurrent resets with the same token
        // cannot both change the secret.
        let consumed = self
            .store_call("reset_ledger.mark_used", self.reset_ledger.mark_used(record.id, now))
            .await?;
        if !consumed {
            return Err(TokenError::TokenRevoked.into());
        }

        self.store_call(
            "credentials.update_secret_hash",
            self.credentials.update_secret_hash(user.id, &secret_hash),
        )
        .await?;

        self.registry()
            .revoke(&claims.jti, claims.expires_at(), RevocationReason::PasswordReset);

        let revoked = self
            .terminate_user(user.id, RevocationReason::PasswordReset)
            .await?;

        info!(user_id = %user.id, revoked, "Password reset completed");
        Ok(())
    }

    pub fn is_active(&self, user_id: Uuid) -> bool {
        self.sessions().is_active(user_id)
    }

    pub fn time_remaining(&self, user_id: Uuid) -> Option<i64> {
        self.sessions().time_remaining(user_id)
    }

    pub fn active_sessions(&self) -> Vec<SessionInfo> {
        self.sessions().active_sessions()
    }

    pub fn session_stats(&self) -> SessionStats {
        self.sessions().stats()
    }

    pub async fn token_statistics(&self) -> DomainResult<TokenStatistics> {
        self.rotation.statistics().await
    }

    /// Start the registry and session sweeps
    pub fn start_background_tasks(&self) {
        self.registry().start();
        self.sessions().start();
    }

    /// Stop the sweeps and wait for them to exit
    pub async fn stop_background_tasks(&self) {
        self.registry().stop().await;
        self.sessions().stop().await;
    }
}
