//! Helpers applied at the service boundary: bounded ledger I/O and
//! collapsing security verdicts.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::errors::{AuthError, DomainError, DomainResult};

/// Run a ledger call with an upper time bound.
///
/// An elapsed timeout is an infrastructure failure, never a security one.
pub(crate) async fn bounded<T, F>(timeout: Duration, operation: &'static str, call: F) -> DomainResult<T>
where
    F: Future<Output = DomainResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation,
                timeout_ms = timeout.as_millis() as u64,
                "Ledger call timed out"
            );
            Err(DomainError::infrastructure(format!("{} timed out", operation)))
        }
    }
}

/// Collapse a security verdict into `Unauthorized`, logging the specific
/// reason. Other errors pass through unchanged.
pub(crate) fn conceal(operation: &'static str, err: DomainError) -> DomainError {
    if err.is_security_failure() {
        warn!(operation, reason = %err, "Request rejected");
        AuthError::Unauthorized.into()
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TokenError;

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out_as_infrastructure() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, DomainError>(1)
        };

        let err = bounded(Duration::from_millis(100), "ledger.find_by_id", slow)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let value = bounded(Duration::from_secs(1), "op", async { Ok::<_, DomainError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_conceal() {
        assert_eq!(
            conceal("rotate", TokenError::TokenRevoked.into()),
            DomainError::Auth(AuthError::Unauthorized)
        );
        assert_eq!(
            conceal("rotate", AuthError::SessionExpired.into()),
            DomainError::Auth(AuthError::Unauthorized)
        );

        let infra = DomainError::infrastructure("down");
        assert_eq!(conceal("rotate", infra.clone()), infra);
    }
}
