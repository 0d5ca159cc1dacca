//! Unit tests for the password reset flow

use chrono::Duration;
use std::sync::Arc;

use crate::domain::entities::token::RevocationReason;
use crate::domain::value_objects::FORGOT_PASSWORD_MESSAGE;
use crate::errors::{AuthError, DomainError};

use super::mocks::{RecordingNotifier, TestContext, PASSWORD};

const NEW_PASSWORD: &str = "new-and-improved-secret";

fn unauthorized() -> DomainError {
    DomainError::Auth(AuthError::Unauthorized)
}

async fn request_reset(ctx: &TestContext) -> String {
    let response = ctx.service.forgot_password("alice@example.com").await.unwrap();
    assert_eq!(response.message, FORGOT_PASSWORD_MESSAGE);
    ctx.notifier.last_token().unwrap()
}

#[tokio::test]
async fn test_forgot_password_issues_token() {
    let ctx = TestContext::new().await;

    let token = request_reset(&ctx).await;

    assert_eq!(ctx.reset_ledger.len(), 1);
    let stored = ctx.reset_ledger.tokens.lock().unwrap()[0].clone();
    assert_eq!(stored.user_id, ctx.user.id);
    assert_ne!(stored.token_hash, token);
    assert!(stored.used_at.is_none());
    assert_eq!(
        stored.expires_at.timestamp() - stored.created_at.timestamp(),
        Duration::hours(1).num_seconds()
    );
}

#[tokio::test]
async fn test_forgot_password_inactive_user() {
    let ctx = TestContext::new().await;
    ctx.credentials.set_active(ctx.user.id, false);

    let response = ctx.service.forgot_password("alice@example.com").await.unwrap();

    assert_eq!(response.message, FORGOT_PASSWORD_MESSAGE);
    assert_eq!(ctx.reset_ledger.len(), 0);
}

#[tokio::test]
async fn test_forgot_password_hides_delivery_failure() {
    let ctx = TestContext::with_notifier(RecordingNotifier {
        fail: true,
        ..Default::default()
    })
    .await;

    let response = ctx.service.forgot_password("alice@example.com").await.unwrap();

    assert_eq!(response.message, FORGOT_PASSWORD_MESSAGE);
    assert_eq!(ctx.notifier.count(), 1);
}

#[tokio::test]
async fn test_reset_password() {
    let ctx = TestContext::new().await;
    let login = ctx.service.login("alice", PASSWORD, None, None).await.unwrap();
    let token = request_reset(&ctx).await;

    ctx.service.reset_password(&token, NEW_PASSWORD).await.unwrap();

    // The new secret works and the old one does not
    assert!(ctx.service.login("alice", PASSWORD, None, None).await.is_err());

    // Existing sessions and tokens are gone
    assert!(ctx.service.authenticate(&login.tokens.access_token).is_err());
    let record = ctx.ledger.get(&ctx.jti(&login.tokens.refresh_token)).await.unwrap();
    assert_eq!(record.revoked_reason, Some(RevocationReason::PasswordReset));
    assert!(ctx.service.registry().is_revoked(&ctx.jti(&token)));

    let relogin = ctx.service.login("alice", NEW_PASSWORD, None, None).await;
    assert!(relogin.is_ok());
    assert_eq!(
        ctx.service.refresh(&login.tokens.refresh_token, None).await.unwrap_err(),
        unauthorized()
    );
}

#[tokio::test]
async fn test_reset_token_is_single_use() {
    let ctx = TestContext::new().await;
    let token = request_reset(&ctx).await;

    ctx.service.reset_password(&token, NEW_PASSWORD).await.unwrap();
    assert!(ctx.reset_ledger.tokens.lock().unwrap()[0].used_at.is_some());

    assert_eq!(
        ctx.service.reset_password(&token, "yet-another-secret").await.unwrap_err(),
        unauthorized()
    );
    assert!(ctx.service.login("alice", NEW_PASSWORD, None, None).await.is_ok());
}

#[tokio::test]
async fn test_newer_reset_supersedes_older() {
    let ctx = TestContext::new().await;
    let first = request_reset(&ctx).await;
    let second = request_reset(&ctx).await;

    assert_ne!(first, second);
    assert_eq!(
        ctx.service.reset_password(&first, NEW_PASSWORD).await.unwrap_err(),
        unauthorized()
    );
    assert!(ctx.service.reset_password(&second, NEW_PASSWORD).await.is_ok());
}

#[tokio::test]
async fn test_expired_reset_token() {
    let ctx = TestContext::new().await;
    let token = request_reset(&ctx).await;

    ctx.clock.advance(Duration::minutes(61));

    assert_eq!(
        ctx.service.reset_password(&token, NEW_PASSWORD).await.unwrap_err(),
        unauthorized()
    );
    assert!(ctx.service.login("alice", PASSWORD, None, None).await.is_ok());
}

#[tokio::test]
async fn test_reset_rejects_other_token_kinds() {
    let ctx = TestContext::new().await;
    let login = ctx.service.login("alice", PASSWORD, None, None).await.unwrap();

    for token in [&login.tokens.access_token, &login.tokens.refresh_token] {
        assert_eq!(
            ctx.service.reset_password(token, NEW_PASSWORD).await.unwrap_err(),
            unauthorized()
        );
    }
    assert_eq!(
        ctx.service.reset_password("garbage", NEW_PASSWORD).await.unwrap_err(),
        unauthorized()
    );
}

#[tokio::test]
async fn test_reset_rejects_short_secret() {
    let ctx = TestContext::new().await;
    let token = request_reset(&ctx).await;

    assert!(matches!(
        ctx.service.reset_password(&token, "short").await,
        Err(DomainError::Validation { .. })
    ));

    // The token was not consumed
    assert!(ctx.service.reset_password(&token, NEW_PASSWORD).await.is_ok());
}

#[tokio::test]
async fn test_reset_for_deactivated_user() {
    let ctx = TestContext::new().await;
    let token = request_reset(&ctx).await;
    ctx.credentials.set_active(ctx.user.id, false);

    assert_eq!(
        ctx.service.reset_password(&token, NEW_PASSWORD).await.unwrap_err(),
        unauthorized()
    );
    assert!(ctx.reset_ledger.tokens.lock().unwrap()[0].used_at.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resets_have_single_winner() {
    let ctx = Arc::new(TestContext::new().await);
    let token = request_reset(&ctx).await;

    let handles: Vec<_> = ["first-new-secret", "second-new-secret"]
        .into_iter()
        .map(|secret| {
            let ctx = ctx.clone();
            let token = token.clone();
            tokio::spawn(async move { ctx.service.reset_password(&token, secret).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
}
