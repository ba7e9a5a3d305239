//! Core subsystems for the hotpod load-generation target.
//!
//! Hotpod receives requests and performs configurable work: burning CPU,
//! holding memory, doing file I/O, stalling, failing, or processing backlog
//! items. This crate holds the five cooperating cores: the lifecycle state
//! machine, the admission tracker, the fault injector, the work queue with
//! its worker pool, and the workload executors — plus the chaos primitives,
//! the sidecar runner, and the metrics registry they all report into.

pub mod admission;
pub mod chaos;
pub mod fault;
pub mod lifecycle;
pub mod metrics;
pub mod procinfo;
pub mod queue;
pub mod sidecar;
pub mod worker;
pub mod workload;

pub use admission::{AdmissionTracker, OpClass, OpGuard, TooManyOps};
pub use fault::{ErrorRule, FaultInjector};
pub use lifecycle::{Lifecycle, RequestGuard, State};
pub use metrics::Metrics;
pub use queue::{Item, Priority, Queue, QueueFull, Stats};
pub use worker::WorkerPool;
