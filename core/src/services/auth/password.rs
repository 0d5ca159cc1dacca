//! Secret hashing and input validation

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::error;

use crate::errors::{DomainError, DomainResult};

/// Regular expression for a plausible email address
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").unwrap()
});

/// Validate an email address format
pub fn validate_email(email: &str) -> DomainResult<()> {
    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(DomainError::Validation {
            message: "Invalid email address".to_string(),
        })
    }
}

/// Enforce the minimum secret length
pub fn validate_secret(secret: &str, min_length: usize) -> DomainResult<()> {
    if secret.chars().count() < min_length {
        return Err(DomainError::Validation {
            message: format!("Password must be at least {} characters", min_length),
        });
    }
    Ok(())
}

/// bcrypt-hash a secret off the async runtime
pub async fn hash_secret(secret: &str, cost: u32) -> DomainResult<String> {
    let secret = secret.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(secret, cost))
        .await
        .map_err(|e| DomainError::internal(format!("hash task failed: {}", e)))?
        .map_err(|e| {
            error!(error = %e, "Failed to hash secret");
            DomainError::internal("failed to hash secret")
        })
}

/// Compare a secret against a bcrypt hash. A malformed hash never matches.
pub async fn verify_secret(secret: &str, hash: &str) -> DomainResult<bool> {
    let secret = secret.to_string();
    let hash = hash.to_string();
    let verdict = tokio::task::spawn_blocking(move || bcrypt::verify(secret, &hash))
        .await
        .map_err(|e| DomainError::internal(format!("verify task failed: {}", e)))?;

    match verdict {
        Ok(matches) => Ok(matches),
        Err(e) => {
            error!(error = %e, "Stored secret hash is malformed");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ops@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_validate_secret() {
        assert!(validate_secret("12345678", 8).is_ok());
        assert!(matches!(
            validate_secret("short", 8),
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_secret("correct horse", 4).await.unwrap();
        assert!(verify_secret("correct horse", &hash).await.unwrap());
        assert!(!verify_secret("wrong horse", &hash).await.unwrap());
        assert!(!verify_secret("anything", "not-a-bcrypt-hash").await.unwrap());
    }
}
