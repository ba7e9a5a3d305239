//! Service container: builds the core subsystems for the configured mode.

use std::sync::Arc;

use anyhow::Result;

use hotpod_config::{HotpodConfig, Mode};
use hotpod_core::{
    sidecar::Runner, AdmissionTracker, FaultInjector, Lifecycle, Metrics, Queue, WorkerPool,
};
use hotpod_rest_api::AppContext;

/// All constructed services, wired into an [`AppContext`] for the router.
pub struct ServiceContainer {
    pub context: AppContext,
}

impl ServiceContainer {
    /// Build every subsystem for the configured mode. Must run inside a
    /// tokio runtime (the lifecycle spawns its startup timer).
    pub fn new(config: HotpodConfig, version: &str) -> Result<Self> {
        let config = Arc::new(config);
        let metrics = Arc::new(Metrics::new()?);

        let lifecycle = Lifecycle::new(&config.lifecycle, metrics.clone());
        let tracker = Arc::new(AdmissionTracker::new(config.limits.max_concurrent_ops));
        let injector = Arc::new(FaultInjector::new());

        let (queue, worker_pool, sidecar) = match config.server.mode {
            Mode::App => {
                metrics.sidecar_mode.set(0);
                let queue = Arc::new(Queue::new(config.queue.max_depth, metrics.clone()));
                let pool = Arc::new(WorkerPool::new(queue.clone(), metrics.clone()));
                (Some(queue), Some(pool), None)
            }
            Mode::Sidecar => {
                metrics.sidecar_mode.set(1);
                let runner = Arc::new(Runner::new(&config.sidecar, metrics.clone()));
                (None, None, Some(runner))
            }
        };

        Ok(Self {
            context: AppContext {
                config,
                metrics,
                lifecycle,
                tracker,
                injector,
                queue,
                worker_pool,
                sidecar,
                version: version.to_string(),
            },
        })
    }
}
