//! Unit tests for token issuance and verification

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::token::{TokenKind, PASSWORD_RESET_PURPOSE};
use crate::errors::{DomainError, TokenError};
use crate::services::clock::ManualClock;
use crate::services::token::hash_token;

use super::create_issuer;

#[test]
fn test_issue_pair() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let issuer = create_issuer(clock);
    let user_id = Uuid::new_v4();

    let issued = issuer.issue_pair(user_id).unwrap();

    assert_ne!(issued.pair.access_token, issued.pair.refresh_token);
    assert_ne!(issued.access_claims.jti, issued.refresh_claims.jti);
    assert_eq!(issued.pair.access_expires_in, 15 * 60);
    assert_eq!(issued.pair.refresh_expires_in, 7 * 24 * 3600);

    let access = issuer.verify(&issued.pair.access_token, TokenKind::Access).unwrap();
    assert_eq!(access.user_id().unwrap(), user_id);
    assert_eq!(access.token_type, TokenKind::Access);
    assert_eq!(access.iss, "changegate");
    assert_eq!(access.aud, "changegate-api");

    let refresh = issuer.verify(&issued.pair.refresh_token, TokenKind::Refresh).unwrap();
    assert_eq!(refresh.jti, issued.refresh_claims.jti);
}

#[test]
fn test_unique_identifiers() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let issuer = create_issuer(clock);
    let user_id = Uuid::new_v4();

    let first = issuer.issue_pair(user_id).unwrap();
    let second = issuer.issue_pair(user_id).unwrap();

    assert_ne!(first.refresh_claims.jti, second.refresh_claims.jti);
    assert_ne!(first.pair.refresh_token, second.pair.refresh_token);
}

#[test]
fn test_kinds_are_not_interchangeable() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let issuer = create_issuer(clock);
    let issued = issuer.issue_pair(Uuid::new_v4()).unwrap();

    assert_eq!(
        issuer.verify(&issued.pair.access_token, TokenKind::Refresh),
        Err(DomainError::Token(TokenError::InvalidToken))
    );
    assert_eq!(
        issuer.verify(&issued.pair.refresh_token, TokenKind::Access),
        Err(DomainError::Token(TokenError::InvalidToken))
    );
    assert!(issuer.verify(&issued.pair.access_token, TokenKind::Reset).is_err());
}

#[test]
fn test_expiry_uses_injected_clock() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let issuer = create_issuer(clock.clone());
    let issued = issuer.issue_pair(Uuid::new_v4()).unwrap();

    clock.advance(Duration::minutes(15));

    assert_eq!(
        issuer.verify(&issued.pair.access_token, TokenKind::Access),
        Err(DomainError::Token(TokenError::TokenExpired))
    );
    assert!(issuer
        .verify_allow_expired(&issued.pair.access_token, TokenKind::Access)
        .is_ok());
    assert!(issuer.verify(&issued.pair.refresh_token, TokenKind::Refresh).is_ok());
}

#[test]
fn test_tampered_token_is_rejected() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let issuer = create_issuer(clock);
    let issued = issuer.issue_pair(Uuid::new_v4()).unwrap();

    let mut tampered = issued.pair.access_token.clone();
    tampered.pop();
    tampered.push(if issued.pair.access_token.ends_with('A') { 'B' } else { 'A' });

    assert!(issuer.verify(&tampered, TokenKind::Access).is_err());
    assert!(issuer.verify("not-a-jwt", TokenKind::Access).is_err());
}

#[test]
fn test_password_reset_token() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let issuer = create_issuer(clock.clone());
    let user_id = Uuid::new_v4();

    let (token, claims) = issuer.issue_password_reset(user_id).unwrap();
    assert_eq!(claims.purpose.as_deref(), Some(PASSWORD_RESET_PURPOSE));
    assert_eq!(claims.token_type, TokenKind::Reset);

    let verified = issuer.verify(&token, TokenKind::Reset).unwrap();
    assert_eq!(verified.purpose.as_deref(), Some(PASSWORD_RESET_PURPOSE));

    clock.advance(Duration::hours(1));
    assert!(issuer.verify(&token, TokenKind::Reset).is_err());
}

#[test]
fn test_decode_unsafe() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let issuer = create_issuer(clock.clone());
    let issued = issuer.issue_pair(Uuid::new_v4()).unwrap();

    clock.advance(Duration::days(30));
    let claims = issuer.decode_unsafe(&issued.pair.refresh_token).unwrap();
    assert_eq!(claims.jti, issued.refresh_claims.jti);

    assert!(issuer.decode_unsafe("garbage").is_none());
}

#[test]
fn test_hash_token() {
    let hash = hash_token("some-token");
    assert_eq!(hash.len(), 64);
    assert_eq!(hash, hash_token("some-token"));
    assert_ne!(hash, hash_token("other-token"));
}
