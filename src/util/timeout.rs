//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::auth::AuthError;
use crate::error::ClientError;

/// Errors that can represent an elapsed deadline.
pub trait TimeoutError {
    fn timed_out(millis: u64) -> Self;
}

impl TimeoutError for ClientError {
    fn timed_out(millis: u64) -> Self {
        ClientError::Timeout(millis)
    }
}

impl TimeoutError for AuthError {
    fn timed_out(millis: u64) -> Self {
        AuthError::Timeout(millis)
    }
}

/// Wrap a future with a timeout.
pub async fn with_timeout<T, E: TimeoutError>(
    duration: Duration,
    future: impl Future<Output = Result<T, E>>,
) -> Result<T, E> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(E::timed_out(duration.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn elapsed_deadline_maps_to_timeout_variant() {
        let result: Result<(), ClientError> = with_timeout(Duration::from_secs(15), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ClientError::Timeout(15_000))));
    }

    #[tokio::test]
    async fn completed_future_passes_through() {
        let result: Result<u8, AuthError> =
            with_timeout(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
