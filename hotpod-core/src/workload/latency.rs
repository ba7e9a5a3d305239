//! Latency executor: a cancellable sleep.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Sleep for `duration` or until the token fires. Returns true when
/// cancelled early.
pub async fn sleep_for(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = token.cancelled() => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn completes_after_the_duration() {
        let token = CancellationToken::new();
        let start = tokio::time::Instant::now();

        assert!(!sleep_for(&token, Duration::from_secs(2)).await);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_sleep() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(sleep_for(&token, Duration::from_secs(3600)).await);
    }
}
