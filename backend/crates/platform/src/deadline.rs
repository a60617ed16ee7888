//! Bounded external calls
//!
//! Wraps a future so that a hung store or identity-service call surfaces as
//! an error instead of holding the request open.

use std::future::Future;
use std::time::Duration;

/// Result of a bounded call
#[derive(Debug, thiserror::Error)]
pub enum DeadlineError<E> {
    #[error("operation timed out after {0:?}")]
    Elapsed(Duration),

    #[error(transparent)]
    Inner(E),
}

/// Run `fut`, failing with [`DeadlineError::Elapsed`] after `limit`.
pub async fn bounded<F, T, E>(limit: Duration, fut: F) -> Result<T, DeadlineError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(DeadlineError::Inner),
        Err(_) => Err(DeadlineError::Elapsed(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_through() {
        let ok: Result<u8, DeadlineError<&str>> =
            bounded(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<u8, DeadlineError<&str>> =
            bounded(Duration::from_secs(1), async { Err("boom") }).await;
        assert!(matches!(err, Err(DeadlineError::Inner("boom"))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, &str>(())
        };
        let result = bounded(Duration::from_millis(50), slow).await;
        assert!(matches!(result, Err(DeadlineError::Elapsed(_))));
    }
}
