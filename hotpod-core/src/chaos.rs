//! Chaos primitives: crash, hang, and OOM simulation.
//!
//! These deliberately misbehave and are not safety-capped. The OOM sink is
//! process-global and mutex-serialized so only one simulation runs at a
//! time; its memory is never reclaimed while the process lives.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Terminate the process with the given exit code after an optional delay.
pub async fn crash(delay: Duration, exit_code: i32) {
    if !delay.is_zero() {
        warn!(?delay, exit_code, "crash scheduled");
        tokio::time::sleep(delay).await;
    }
    error!(exit_code, "crashing process");
    std::process::exit(exit_code);
}

/// Block for `duration`, or indefinitely when it is zero, until the token
/// fires. Returns true when interrupted by cancellation.
pub async fn hang(token: &CancellationToken, duration: Duration) -> bool {
    warn!(?duration, "hang initiated");

    if duration.is_zero() {
        token.cancelled().await;
        return true;
    }

    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = token.cancelled() => true,
    }
}

/// Retains OOM allocations for the life of the process. The lock also
/// serializes simulations: a second caller waits for the first to stop.
static OOM_SINK: tokio::sync::Mutex<Vec<Vec<u8>>> = tokio::sync::Mutex::const_new(Vec::new());

/// Allocate memory at `rate` bytes per second, touching every byte, until
/// the process dies or the token fires. Each run resets the sink from any
/// previous run before growing it again.
pub async fn oom(token: CancellationToken, rate: i64) {
    let mut sink = OOM_SINK.lock().await;

    warn!(rate_bytes_per_sec = rate, "OOM simulation started");
    sink.clear();
    sink.shrink_to_fit();

    // Ten allocations per second, at least 1 KiB each.
    let alloc_size = (rate / 10).max(1024) as usize;
    let mut interval = tokio::time::interval(Duration::from_millis(100));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut total_allocated: i64 = 0;
    let mut next_log: i64 = 100 << 20;
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                info!(total_allocated, "OOM simulation cancelled");
                return;
            }
            _ = interval.tick() => {
                let buf = tokio::task::spawn_blocking(move || {
                    let mut buf = vec![0u8; alloc_size];
                    for (i, b) in buf.iter_mut().enumerate() {
                        *b = i as u8;
                    }
                    buf
                })
                .await;
                let Ok(buf) = buf else { return };

                sink.push(buf);
                total_allocated += alloc_size as i64;

                if total_allocated >= next_log {
                    info!(allocated_mb = total_allocated >> 20, "OOM progress");
                    next_log += 100 << 20;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn hang_completes_after_duration() {
        let token = CancellationToken::new();
        let start = tokio::time::Instant::now();

        assert!(!hang(&token, Duration::from_secs(5)).await);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn hang_with_zero_duration_blocks_until_cancelled() {
        let token = CancellationToken::new();
        let hang_token = token.clone();
        let handle = tokio::spawn(async move { hang(&hang_token, Duration::ZERO).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        token.cancel();
        assert!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn oom_allocates_until_cancelled() {
        let token = CancellationToken::new();
        let oom_token = token.clone();
        let handle = tokio::spawn(oom(oom_token, 1 << 20));

        tokio::time::sleep(Duration::from_millis(350)).await;
        token.cancel();

        let start = Instant::now();
        handle.await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));

        // The sink retained the allocations from the cancelled run.
        let sink = OOM_SINK.lock().await;
        assert!(!sink.is_empty());
    }
}
