//! Prometheus metrics registry.
//!
//! All instruments live under the `hotpod` namespace and are owned by a
//! single [`Metrics`] value that components receive by injection; nothing
//! registers into a global registry.

use prometheus::{
    Counter, Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, HistogramVec, IntCounter,
    IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "hotpod";

/// Every metric exported by hotpod.
pub struct Metrics {
    registry: Registry,

    // Request handling
    pub requests_total: IntCounterVec,
    pub request_duration_seconds: HistogramVec,
    pub in_flight_requests: IntGauge,

    // Resource consumption
    pub cpu_seconds_total: Counter,
    pub memory_allocated_bytes: IntGauge,
    pub io_bytes_total: IntCounterVec,

    // Lifecycle
    pub startup_complete: IntGauge,
    pub startup_duration_seconds: Gauge,
    pub shutdown_in_progress: IntGauge,
    pub shutdown_started_timestamp_seconds: Gauge,

    // Fault injection
    pub fault_errors_injected_total: IntCounterVec,
    pub fault_error_rate: GaugeVec,

    // Sidecar mode
    pub sidecar_cpu_burn_seconds_total: Counter,
    pub sidecar_memory_held_bytes: IntGauge,
    pub sidecar_mode: IntGauge,

    // Work queue
    pub queue_depth: IntGauge,
    pub queue_depth_by_priority: IntGaugeVec,
    pub queue_items_enqueued_total: IntCounter,
    pub queue_items_processed_total: IntCounter,
    pub queue_items_failed_total: IntCounter,
    pub queue_active_workers: IntGauge,
    pub queue_processing_seconds: Histogram,
    pub queue_oldest_item_age_seconds: Gauge,
}

impl Metrics {
    /// Create and register all hotpod metrics on a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            opts(
                "requests_total",
                "Total number of HTTP requests by endpoint and status code.",
            ),
            &["endpoint", "status"],
        )?;
        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "request_duration_seconds",
                "HTTP request duration in seconds by endpoint.",
            )
            .namespace(NAMESPACE),
            &["endpoint"],
        )?;
        let in_flight_requests = IntGauge::with_opts(opts(
            "in_flight_requests",
            "Number of HTTP requests currently being processed.",
        ))?;

        let cpu_seconds_total = Counter::with_opts(opts(
            "cpu_seconds_total",
            "Total CPU time consumed by load generation in seconds.",
        ))?;
        let memory_allocated_bytes = IntGauge::with_opts(opts(
            "memory_allocated_bytes",
            "Bytes currently allocated for memory load generation.",
        ))?;
        let io_bytes_total = IntCounterVec::new(
            opts("io_bytes_total", "Total bytes transferred by I/O operations."),
            &["operation"],
        )?;

        let startup_complete = IntGauge::with_opts(opts(
            "startup_complete",
            "Whether the server has completed startup (0 or 1).",
        ))?;
        let startup_duration_seconds = Gauge::with_opts(opts(
            "startup_duration_seconds",
            "Time taken for server to become ready in seconds.",
        ))?;
        let shutdown_in_progress = IntGauge::with_opts(opts(
            "shutdown_in_progress",
            "Whether the server is shutting down (0 or 1).",
        ))?;
        let shutdown_started_timestamp_seconds = Gauge::with_opts(opts(
            "shutdown_started_timestamp_seconds",
            "Unix timestamp when shutdown started (0 if not shutting down).",
        ))?;

        let fault_errors_injected_total = IntCounterVec::new(
            opts(
                "fault_errors_injected_total",
                "Total number of errors injected by fault injection.",
            ),
            &["endpoint", "status"],
        )?;
        let fault_error_rate = GaugeVec::new(
            opts(
                "fault_error_rate",
                "Configured error injection rate by endpoint.",
            ),
            &["endpoint"],
        )?;

        let sidecar_cpu_burn_seconds_total = Counter::with_opts(opts(
            "sidecar_cpu_burn_seconds_total",
            "Total CPU time burned by sidecar mode in seconds.",
        ))?;
        let sidecar_memory_held_bytes = IntGauge::with_opts(opts(
            "sidecar_memory_held_bytes",
            "Bytes currently held by sidecar memory allocation.",
        ))?;
        let sidecar_mode = IntGauge::with_opts(opts(
            "sidecar_mode",
            "Whether the server is running in sidecar mode (0 or 1).",
        ))?;

        let queue_depth =
            IntGauge::with_opts(opts("queue_depth", "Total number of items in the queue."))?;
        let queue_depth_by_priority = IntGaugeVec::new(
            opts(
                "queue_depth_by_priority",
                "Number of items in the queue by priority.",
            ),
            &["priority"],
        )?;
        let queue_items_enqueued_total = IntCounter::with_opts(opts(
            "queue_items_enqueued_total",
            "Total number of items enqueued.",
        ))?;
        let queue_items_processed_total = IntCounter::with_opts(opts(
            "queue_items_processed_total",
            "Total number of items processed successfully.",
        ))?;
        let queue_items_failed_total = IntCounter::with_opts(opts(
            "queue_items_failed_total",
            "Total number of items that failed processing.",
        ))?;
        let queue_active_workers = IntGauge::with_opts(opts(
            "queue_active_workers",
            "Number of workers currently processing items.",
        ))?;
        let queue_processing_seconds = Histogram::with_opts(
            HistogramOpts::new("queue_processing_seconds", "Time spent processing queue items.")
                .namespace(NAMESPACE),
        )?;
        let queue_oldest_item_age_seconds = Gauge::with_opts(opts(
            "queue_oldest_item_age_seconds",
            "Age of the oldest item in the queue in seconds.",
        ))?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;
        registry.register(Box::new(in_flight_requests.clone()))?;
        registry.register(Box::new(cpu_seconds_total.clone()))?;
        registry.register(Box::new(memory_allocated_bytes.clone()))?;
        registry.register(Box::new(io_bytes_total.clone()))?;
        registry.register(Box::new(startup_complete.clone()))?;
        registry.register(Box::new(startup_duration_seconds.clone()))?;
        registry.register(Box::new(shutdown_in_progress.clone()))?;
        registry.register(Box::new(shutdown_started_timestamp_seconds.clone()))?;
        registry.register(Box::new(fault_errors_injected_total.clone()))?;
        registry.register(Box::new(fault_error_rate.clone()))?;
        registry.register(Box::new(sidecar_cpu_burn_seconds_total.clone()))?;
        registry.register(Box::new(sidecar_memory_held_bytes.clone()))?;
        registry.register(Box::new(sidecar_mode.clone()))?;
        registry.register(Box::new(queue_depth.clone()))?;
        registry.register(Box::new(queue_depth_by_priority.clone()))?;
        registry.register(Box::new(queue_items_enqueued_total.clone()))?;
        registry.register(Box::new(queue_items_processed_total.clone()))?;
        registry.register(Box::new(queue_items_failed_total.clone()))?;
        registry.register(Box::new(queue_active_workers.clone()))?;
        registry.register(Box::new(queue_processing_seconds.clone()))?;
        registry.register(Box::new(queue_oldest_item_age_seconds.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration_seconds,
            in_flight_requests,
            cpu_seconds_total,
            memory_allocated_bytes,
            io_bytes_total,
            startup_complete,
            startup_duration_seconds,
            shutdown_in_progress,
            shutdown_started_timestamp_seconds,
            fault_errors_injected_total,
            fault_error_rate,
            sidecar_cpu_burn_seconds_total,
            sidecar_memory_held_bytes,
            sidecar_mode,
            queue_depth,
            queue_depth_by_priority,
            queue_items_enqueued_total,
            queue_items_processed_total,
            queue_items_failed_total,
            queue_active_workers,
            queue_processing_seconds,
            queue_oldest_item_age_seconds,
        })
    }

    /// Render the registry in Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

fn opts(name: &str, help: &str) -> Opts {
    Opts::new(name, help).namespace(NAMESPACE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_and_encodes() {
        let metrics = Metrics::new().unwrap();
        metrics
            .requests_total
            .with_label_values(&["/cpu", "200"])
            .inc();
        metrics.queue_depth.set(3);

        let text = metrics.encode();
        assert!(text.contains("hotpod_requests_total"));
        assert!(text.contains("hotpod_queue_depth 3"));
    }

    #[test]
    fn fresh_registries_do_not_collide() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.in_flight_requests.inc();
        assert_eq!(b.in_flight_requests.get(), 0);
    }
}
