//! Server lifecycle state machine.
//!
//! The lifecycle moves monotonically through `Starting -> Ready ->
//! ShuttingDown`. Readiness can additionally be forced either way by an
//! admin override, and shutdown follows a bounded drain protocol: flip the
//! state, wait out an optional pre-stop delay, then poll the in-flight
//! counter until it reaches zero or the timeout elapses.

use std::fmt;
use std::sync::atomic::{AtomicI32, AtomicI64, AtomicI8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::metrics::Metrics;
use hotpod_config::LifecycleConfig;

const STATE_STARTING: i32 = 0;
const STATE_READY: i32 = 1;
const STATE_SHUTTING_DOWN: i32 = 2;

const OVERRIDE_NONE: i8 = 0;
const OVERRIDE_NOT_READY: i8 = 1;
const OVERRIDE_READY: i8 = 2;

/// Cadence at which shutdown polls the in-flight counter.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Server lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Starting,
    Ready,
    ShuttingDown,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Starting => "starting",
            State::Ready => "ready",
            State::ShuttingDown => "shutting_down",
        }
    }

    fn from_raw(raw: i32) -> State {
        match raw {
            STATE_READY => State::Ready,
            STATE_SHUTTING_DOWN => State::ShuttingDown,
            _ => State::Starting,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manages server startup and shutdown states.
pub struct Lifecycle {
    state: AtomicI32,
    in_flight: AtomicI64,
    ready_override: AtomicI8,

    start_instant: Instant,
    started_at: DateTime<Utc>,
    ready_at: OnceLock<DateTime<Utc>>,

    /// Actual startup delay including the jitter sampled at construction.
    startup_duration: Duration,
    shutdown_delay: Duration,
    shutdown_timeout: Duration,
    drain_immediately: bool,

    metrics: Arc<Metrics>,
}

/// In-flight guard returned by [`Lifecycle::track_request`]; decrements the
/// counter exactly once when dropped.
pub struct RequestGuard {
    lifecycle: Arc<Lifecycle>,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.lifecycle.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

impl Lifecycle {
    /// Create a lifecycle manager and start the readiness timer. Must be
    /// called from within a tokio runtime.
    pub fn new(config: &LifecycleConfig, metrics: Arc<Metrics>) -> Arc<Self> {
        let mut startup_duration = config.startup_delay;
        if !config.startup_jitter.is_zero() {
            let jitter_nanos = config.startup_jitter.as_nanos() as u64;
            startup_duration += Duration::from_nanos(rand::thread_rng().gen_range(0..jitter_nanos));
        }

        let lc = Arc::new(Self {
            state: AtomicI32::new(STATE_STARTING),
            in_flight: AtomicI64::new(0),
            ready_override: AtomicI8::new(OVERRIDE_NONE),
            start_instant: Instant::now(),
            started_at: Utc::now(),
            ready_at: OnceLock::new(),
            startup_duration,
            shutdown_delay: config.shutdown_delay,
            shutdown_timeout: config.shutdown_timeout,
            drain_immediately: config.drain_immediately,
            metrics,
        });

        if lc.startup_duration.is_zero() {
            lc.become_ready();
        } else {
            info!(delay = ?lc.startup_duration, "startup delay configured");
            let waiter = lc.clone();
            tokio::spawn(async move {
                tokio::time::sleep(waiter.startup_duration).await;
                waiter.become_ready();
            });
        }

        lc
    }

    fn become_ready(&self) {
        // Only a Starting server becomes ready; a shutdown that raced the
        // startup timer must not be rolled back.
        if self
            .state
            .compare_exchange(
                STATE_STARTING,
                STATE_READY,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return;
        }

        let _ = self.ready_at.set(Utc::now());
        self.metrics.startup_complete.set(1);
        self.metrics
            .startup_duration_seconds
            .set(self.startup_duration.as_secs_f64());
        info!("server is ready");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        State::from_raw(self.state.load(Ordering::SeqCst))
    }

    /// True when the server should accept traffic. An admin override wins
    /// over the state machine.
    pub fn is_ready(&self) -> bool {
        match self.ready_override_value() {
            Some(forced) => forced,
            None => self.state() == State::Ready,
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.state() == State::ShuttingDown
    }

    /// Remaining startup delay, or zero once past Starting.
    pub fn startup_remaining(&self) -> Duration {
        if self.state() != State::Starting {
            return Duration::ZERO;
        }
        self.startup_duration
            .saturating_sub(self.start_instant.elapsed())
    }

    /// Number of requests currently being processed.
    pub fn in_flight_requests(&self) -> i64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Register an in-flight request. The returned guard decrements the
    /// counter when it goes out of scope.
    pub fn track_request(self: &Arc<Self>) -> RequestGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        RequestGuard {
            lifecycle: self.clone(),
        }
    }

    /// True when new requests should be rejected outright.
    pub fn should_reject_request(&self) -> bool {
        self.drain_immediately && self.is_shutting_down()
    }

    /// Current admin readiness override, if any.
    pub fn ready_override_value(&self) -> Option<bool> {
        match self.ready_override.load(Ordering::SeqCst) {
            OVERRIDE_NOT_READY => Some(false),
            OVERRIDE_READY => Some(true),
            _ => None,
        }
    }

    /// Force readiness on or off, or clear the override.
    pub fn set_ready_override(&self, value: Option<bool>) {
        let raw = match value {
            None => OVERRIDE_NONE,
            Some(false) => OVERRIDE_NOT_READY,
            Some(true) => OVERRIDE_READY,
        };
        self.ready_override.store(raw, Ordering::SeqCst);
    }

    /// When the process started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the server became ready, if it has.
    pub fn ready_at(&self) -> Option<DateTime<Utc>> {
        self.ready_at.get().copied()
    }

    /// Initiate graceful shutdown. Returns `true` if the token fired before
    /// the drain finished. Exceeding the drain timeout is not an error.
    pub async fn shutdown(&self, token: &CancellationToken) -> bool {
        self.state.store(STATE_SHUTTING_DOWN, Ordering::SeqCst);
        self.metrics.shutdown_in_progress.set(1);
        self.metrics
            .shutdown_started_timestamp_seconds
            .set(Utc::now().timestamp() as f64);
        info!("shutdown initiated");

        if !self.shutdown_delay.is_zero() {
            info!(delay = ?self.shutdown_delay, "pre-stop delay");
            tokio::select! {
                _ = tokio::time::sleep(self.shutdown_delay) => {}
                _ = token.cancelled() => return true,
            }
        }

        let deadline = Instant::now() + self.shutdown_timeout;
        while self.in_flight.load(Ordering::Relaxed) > 0 {
            if Instant::now() >= deadline {
                warn!(
                    in_flight = self.in_flight_requests(),
                    "shutdown timeout exceeded"
                );
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(DRAIN_POLL_INTERVAL) => {}
                _ = token.cancelled() => return true,
            }
        }

        info!(in_flight = self.in_flight_requests(), "shutdown complete");
        false
    }
}
