//! Cancellable sleep.

use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// The sleep was interrupted by its cancellation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sleep cancelled")]
pub struct Cancelled;

/// Sleep for `duration` unless `token` is cancelled first.
pub async fn sleep(duration: Duration, token: &CancellationToken) -> Result<(), Cancelled> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sleep_completes() {
        let token = CancellationToken::new();
        assert_eq!(sleep(Duration::from_millis(5), &token).await, Ok(()));
    }

    #[tokio::test]
    async fn test_sleep_interrupted() {
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(sleep(Duration::from_secs(60), &token).await, Err(Cancelled));
    }
}
