//! Shared application context handed to every handler.

use std::sync::Arc;

use hotpod_config::HotpodConfig;
use hotpod_core::{sidecar::Runner, AdmissionTracker, FaultInjector, Lifecycle, Metrics, Queue, WorkerPool};

/// Application context containing all dependencies. Queue, worker pool and
/// sidecar runner are mode-dependent: the queue exists only in app mode,
/// the runner only in sidecar mode.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<HotpodConfig>,
    pub metrics: Arc<Metrics>,
    pub lifecycle: Arc<Lifecycle>,
    pub tracker: Arc<AdmissionTracker>,
    pub injector: Arc<FaultInjector>,
    pub queue: Option<Arc<Queue>>,
    pub worker_pool: Option<Arc<WorkerPool>>,
    pub sidecar: Option<Arc<Runner>>,
    pub version: String,
}
