mod issuer_tests;

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use cg_shared::config::JwtConfig;

use crate::domain::entities::credential::{CredentialRecord, Role};
use crate::repositories::credential::MockCredentialStore;
use crate::repositories::token::MockTokenLedger;
use crate::services::clock::ManualClock;
use crate::services::revocation::RevocationRegistry;
use crate::services::session::SessionTracker;
use crate::services::token::{JwtSigner, TokenIssuer, TokenRotationService, TokenServiceConfig};

pub(super) fn jwt_config() -> JwtConfig {
    JwtConfig::new("access-secret-for-tests", "refresh-secret-for-tests", "reset-secret-for-tests")
}

pub(super) fn create_issuer(clock: Arc<ManualClock>) -> Arc<TokenIssuer> {
    let config = TokenServiceConfig {
        ledger_timeout: std::time::Duration::from_millis(200),
        ..TokenServiceConfig::default()
    };
    Arc::new(TokenIssuer::new(
        Arc::new(JwtSigner::new(&jwt_config())),
        clock,
        config,
    ))
}

pub(super) struct Harness {
    pub clock: Arc<ManualClock>,
    pub ledger: Arc<MockTokenLedger>,
    pub credentials: Arc<MockCredentialStore>,
    pub registry: Arc<RevocationRegistry>,
    pub sessions: Arc<SessionTracker>,
    pub service: Arc<TokenRotationService<MockTokenLedger, MockCredentialStore>>,
    pub user_id: Uuid,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let user = CredentialRecord::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "unused-hash".to_string(),
            Role::Requester,
            Utc::now(),
        );
        let user_id = user.id;

        let ledger = Arc::new(MockTokenLedger::new());
        let credentials = Arc::new(MockCredentialStore::with_user(user));
        let registry = Arc::new(RevocationRegistry::new(
            clock.clone(),
            std::time::Duration::from_secs(300),
        ));
        let sessions = Arc::new(SessionTracker::new(
            clock.clone(),
            Duration::minutes(30),
            std::time::Duration::from_secs(60),
        ));
        let service = Arc::new(TokenRotationService::new(
            create_issuer(clock.clone()),
            ledger.clone(),
            credentials.clone(),
            registry.clone(),
            sessions.clone(),
        ));

        Self {
            clock,
            ledger,
            credentials,
            registry,
            sessions,
            service,
            user_id,
        }
    }

    /// Issue a pair and open a session, as login does
    pub async fn login(&self) -> crate::domain::entities::token::TokenPair {
        let pair = self.service.generate_pair(self.user_id, None).await.unwrap();
        self.sessions.create_session(
            self.user_id,
            pair.access_token.clone(),
            pair.refresh_token.clone(),
            None,
            None,
        );
        pair
    }
}
