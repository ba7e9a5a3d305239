//! Composite workload profiles.
//!
//! A profile fixes a CPU, memory and latency component; the three run in
//! parallel under per-component child tokens, so caller cancellation aborts
//! all of them while each still finishes on its own schedule.

use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use super::cpu::{self, Intensity};
use super::latency;
use super::memory::{self, Pattern};

/// Parameters for a composite workload.
#[derive(Debug, Clone, Copy)]
pub struct WorkProfile {
    pub cpu_duration: Duration,
    pub cpu_cores: usize,
    pub intensity: Intensity,
    pub memory_size: i64,
    pub latency: Duration,
}

/// Look up a named profile.
pub fn profile(name: &str) -> Option<WorkProfile> {
    match name {
        "web" => Some(WorkProfile {
            cpu_duration: Duration::from_millis(20),
            cpu_cores: 1,
            intensity: Intensity::Medium,
            memory_size: 5 << 20,
            latency: Duration::from_millis(50),
        }),
        "api" => Some(WorkProfile {
            cpu_duration: Duration::from_millis(50),
            cpu_cores: 1,
            intensity: Intensity::Medium,
            memory_size: 2 << 20,
            latency: Duration::from_millis(20),
        }),
        "worker" => Some(WorkProfile {
            cpu_duration: Duration::from_millis(200),
            cpu_cores: 2,
            intensity: Intensity::High,
            memory_size: 50 << 20,
            latency: Duration::from_millis(100),
        }),
        "heavy" => Some(WorkProfile {
            cpu_duration: Duration::from_millis(500),
            cpu_cores: 4,
            intensity: Intensity::High,
            memory_size: 100 << 20,
            latency: Duration::from_millis(10),
        }),
        _ => None,
    }
}

/// Result of a composite run.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkOutcome {
    pub cpu_iterations: i64,
    pub cancelled: bool,
}

/// Run the CPU, memory and latency components of a profile concurrently.
pub async fn run(token: &CancellationToken, params: &WorkProfile) -> WorkOutcome {
    let cpu_token = token.child_token();
    let mem_token = token.child_token();
    let latency_token = token.child_token();

    let (burn, mem_cancelled, sleep_cancelled) = tokio::join!(
        cpu::burn(
            &cpu_token,
            params.cpu_duration,
            params.cpu_cores,
            params.intensity
        ),
        memory::hold(
            &mem_token,
            params.memory_size,
            params.cpu_duration,
            Pattern::Random
        ),
        latency::sleep_for(&latency_token, params.latency),
    );

    WorkOutcome {
        cpu_iterations: burn.iterations,
        cancelled: burn.cancelled || mem_cancelled || sleep_cancelled,
    }
}

/// Multiply a duration by a random factor in `[1 - variance, 1 + variance]`.
pub fn apply_variance(d: Duration, variance: f64) -> Duration {
    if variance == 0.0 {
        return d;
    }
    let mult = 1.0 + (rand::thread_rng().gen::<f64>() * 2.0 - 1.0) * variance;
    Duration::from_secs_f64((d.as_secs_f64() * mult).max(0.0))
}

/// Multiply a byte count by a random factor in `[1 - variance, 1 + variance]`.
pub fn apply_variance_size(n: i64, variance: f64) -> i64 {
    if variance == 0.0 {
        return n;
    }
    let mult = 1.0 + (rand::thread_rng().gen::<f64>() * 2.0 - 1.0) * variance;
    (n as f64 * mult) as i64
}
