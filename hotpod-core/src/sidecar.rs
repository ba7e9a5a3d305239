//! Sidecar-mode resource runner.
//!
//! Maintains steady CPU and memory consumption to simulate a sidecar
//! container (e.g., a service-mesh proxy) for ContainerResource HPA
//! testing. The runner holds a touched memory baseline and burns a jittered
//! CPU baseline every second until stopped.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::metrics::Metrics;
use hotpod_config::SidecarConfig;

struct RunnerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Steady-state background resource consumer.
pub struct Runner {
    cpu_baseline: Duration,
    cpu_jitter: Duration,
    memory_baseline: i64,
    metrics: Arc<Metrics>,

    inner: tokio::sync::Mutex<Option<RunnerHandle>>,
}

impl Runner {
    /// Create a runner with the given resource baselines.
    pub fn new(config: &SidecarConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            cpu_baseline: config.cpu_baseline,
            cpu_jitter: config.cpu_jitter,
            memory_baseline: config.memory_baseline,
            metrics,
            inner: tokio::sync::Mutex::new(None),
        }
    }

    /// Allocate the baseline memory and begin the CPU burn loop in a
    /// background task. A second call while running is a no-op.
    pub async fn start(self: &Arc<Self>, parent: &CancellationToken) {
        let mut inner = self.inner.lock().await;
        if inner.is_some() {
            return;
        }

        let token = parent.child_token();
        let runner = self.clone();
        let loop_token = token.clone();
        let task = tokio::spawn(async move { runner.run(loop_token).await });
        *inner = Some(RunnerHandle { token, task });

        info!(
            cpu_baseline = ?self.cpu_baseline,
            cpu_jitter = ?self.cpu_jitter,
            memory_baseline = self.memory_baseline,
            "sidecar runner started"
        );
    }

    /// Release held memory and stop the CPU loop. Safe to call repeatedly.
    pub async fn stop(&self) {
        let Some(handle) = self.inner.lock().await.take() else {
            return;
        };

        handle.token.cancel();
        let _ = handle.task.await;

        self.metrics.sidecar_memory_held_bytes.set(0);
        info!("sidecar runner stopped");
    }

    async fn run(self: Arc<Self>, token: CancellationToken) {
        let baseline = self.memory_baseline.max(0) as usize;
        let memory = if baseline > 0 {
            // Touch every page so the OS actually backs the allocation.
            let held = tokio::task::spawn_blocking(move || {
                let mut buf = vec![0u8; baseline];
                for b in buf.iter_mut() {
                    *b = 1;
                }
                buf
            })
            .await
            .ok();
            self.metrics
                .sidecar_memory_held_bytes
                .set(self.memory_baseline);
            held
        } else {
            None
        };

        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    let burn = self.jittered_burn_duration();
                    if !burn.is_zero() {
                        let _ = tokio::task::spawn_blocking(move || cpu_burn(burn)).await;
                        self.metrics
                            .sidecar_cpu_burn_seconds_total
                            .inc_by(burn.as_secs_f64());
                    }
                }
            }
        }

        drop(memory);
    }

    fn jittered_burn_duration(&self) -> Duration {
        if self.cpu_jitter.is_zero() {
            return self.cpu_baseline;
        }

        let jitter_nanos = self.cpu_jitter.as_nanos() as i64;
        let offset = rand::thread_rng().gen_range(-jitter_nanos..=jitter_nanos);
        let base = self.cpu_baseline.as_nanos() as i64;
        Duration::from_nanos((base + offset).max(0) as u64)
    }
}

/// Tight compute loop for the given duration.
fn cpu_burn(d: Duration) {
    let deadline = std::time::Instant::now() + d;
    let mut x = 1.0f64;
    while std::time::Instant::now() < deadline {
        for _ in 0..1000 {
            x = x.sin() + x.cos();
            x = (x.abs() + 1.0).sqrt();
        }
    }
    std::hint::black_box(x);
}
