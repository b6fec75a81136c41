//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap handler invocations with a deadline
//! - Cancel the invocation cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Expiry drops the inner future; process-backed invocations kill their child
//! - Timeout errors are distinct from other errors (504 at the transport)

use std::future::Future;
use std::time::Duration;

use crate::bridge::InvocationError;

/// Await `fut`, failing with `InvocationError::Timeout` after `limit`.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, InvocationError>
where
    F: Future<Output = Result<T, InvocationError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(InvocationError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_result_through() {
        let result = with_timeout(Duration::from_secs(1), async { Ok::<_, InvocationError>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_expires() {
        let limit = Duration::from_millis(10);
        let result: Result<(), _> = with_timeout(limit, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(InvocationError::Timeout(limit)));
    }
}
