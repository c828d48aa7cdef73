//! Async utilities
//!
//! Deadline handling for outbound calls. Retries are deliberately absent:
//! a failed call surfaces immediately.

use crate::error::{ErrorContext, ErrorKind, ScrivenerError, ScrivenerResult};
use tokio::time::{timeout, Duration};
use tracing::warn;

/// Timeout wrapper for async operations.
///
/// An elapsed deadline becomes an error of `kind`, so each component keeps
/// reporting failures in its own error variant.
pub async fn with_timeout<F, T>(
    future: F,
    timeout_ms: u64,
    operation_name: &str,
    kind: ErrorKind,
) -> ScrivenerResult<T>
where
    F: std::future::Future<Output = T>,
{
    match timeout(Duration::from_millis(timeout_ms), future).await {
        Ok(result) => Ok(result),
        Err(_) => {
            warn!(
                operation = operation_name,
                timeout_ms = timeout_ms,
                "Operation timed out"
            );
            Err(ScrivenerError::new(
                kind,
                format!("{} timed out after {} ms", operation_name, timeout_ms),
                ErrorContext::new("async_utils")
                    .with_operation(operation_name)
                    .with_metadata("timeout_ms", &timeout_ms.to_string())
                    .with_suggestion("Increase the timeout in your configuration")
                    .with_suggestion("Check network connectivity"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_timeout(async { 42 }, 1000, "quick", ErrorKind::Search).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_elapsed_deadline_uses_requested_kind() {
        let result = with_timeout(
            sleep(Duration::from_millis(200)),
            10,
            "slow_generation",
            ErrorKind::Synthesis,
        )
        .await;

        let error = result.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Synthesis);
        assert_eq!(
            error.context().operation.as_deref(),
            Some("slow_generation")
        );
    }
}
