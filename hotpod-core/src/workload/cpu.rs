//! CPU burn executor.
//!
//! Spawns one blocking task per requested core, each running a tight
//! kernel until the duration elapses or the caller cancels. Kernels never
//! run on the async runtime itself.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Kernel intensity for CPU work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    /// Short math kernel with a cooperative yield between iterations
    Low,
    /// Longer transcendental kernel, no yield
    Medium,
    /// Repeated SHA-256 over a 1 KiB buffer
    High,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
        }
    }
}

impl FromStr for Intensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Intensity::Low),
            "medium" => Ok(Intensity::Medium),
            "high" => Ok(Intensity::High),
            _ => Err("intensity must be low, medium, or high".to_string()),
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a CPU burn.
#[derive(Debug, Clone, Copy, Default)]
pub struct BurnOutcome {
    /// Total kernel iterations completed across all cores
    pub iterations: i64,
    /// True when the caller cancelled before the duration elapsed
    pub cancelled: bool,
}

/// Burn CPU across `cores` parallel tasks for `duration`, or until the
/// token fires.
pub async fn burn(
    token: &CancellationToken,
    duration: Duration,
    cores: usize,
    intensity: Intensity,
) -> BurnOutcome {
    let deadline = Instant::now() + duration;

    let mut tasks = JoinSet::new();
    for _ in 0..cores {
        let token = token.clone();
        tasks.spawn_blocking(move || kernel_loop(&token, deadline, intensity));
    }

    let mut outcome = BurnOutcome::default();
    while let Some(result) = tasks.join_next().await {
        if let Ok((iterations, cancelled)) = result {
            outcome.iterations += iterations;
            outcome.cancelled |= cancelled;
        }
    }
    outcome
}

/// Run the intensity's kernel until the deadline or cancellation. Returns
/// iterations completed and whether cancellation cut the burn short.
fn kernel_loop(token: &CancellationToken, deadline: Instant, intensity: Intensity) -> (i64, bool) {
    let mut iterations: i64 = 0;
    let mut hash_buf = [0u8; 1024];

    while Instant::now() < deadline {
        if token.is_cancelled() {
            return (iterations, true);
        }

        match intensity {
            Intensity::Low => {
                for j in 0..100u64 {
                    std::hint::black_box(((j * j) as f64).sqrt());
                }
                iterations += 1;
                std::thread::yield_now();
            }
            Intensity::Medium => {
                let mut x = 1.0f64;
                for _ in 0..1000 {
                    x = x.sin() + x.cos();
                    x = (x.abs() + 1.0).sqrt();
                }
                std::hint::black_box(x);
                iterations += 1;
            }
            Intensity::High => {
                let hash = Sha256::digest(hash_buf);
                hash_buf[..32].copy_from_slice(&hash);
                iterations += 1;
            }
        }
    }

    (iterations, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burns_for_roughly_the_duration() {
        let token = CancellationToken::new();
        let start = Instant::now();
        let outcome = burn(&token, Duration::from_millis(50), 1, Intensity::Medium).await;

        assert!(outcome.iterations > 0);
        assert!(!outcome.cancelled);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn multiple_cores_accumulate_iterations() {
        let token = CancellationToken::new();
        let outcome = burn(&token, Duration::from_millis(30), 4, Intensity::Low).await;
        assert!(outcome.iterations > 0);
    }

    #[tokio::test]
    async fn cancellation_stops_the_burn_quickly() {
        let token = CancellationToken::new();
        token.cancel();

        let start = Instant::now();
        let outcome = burn(&token, Duration::from_secs(10), 2, Intensity::High).await;

        assert!(outcome.cancelled);
        // Each kernel checks the token once per iteration; a cancelled burn
        // must come back well inside the requested ten seconds.
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn all_intensities_make_progress() {
        let token = CancellationToken::new();
        for intensity in [Intensity::Low, Intensity::Medium, Intensity::High] {
            let outcome = burn(&token, Duration::from_millis(20), 1, intensity).await;
            assert!(outcome.iterations > 0, "no progress at {intensity}");
        }
    }

    #[test]
    fn intensity_parsing() {
        assert_eq!("low".parse::<Intensity>().unwrap(), Intensity::Low);
        assert_eq!("high".parse::<Intensity>().unwrap(), Intensity::High);
        assert!("extreme".parse::<Intensity>().is_err());
    }
}
