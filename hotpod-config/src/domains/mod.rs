//! Configuration domains for hotpod.

pub mod lifecycle;
pub mod limits;
pub mod queue;
pub mod server;
pub mod sidecar;

use crate::error::ConfigResult;
use crate::validation::Validatable;

pub use lifecycle::LifecycleConfig;
pub use limits::LimitsConfig;
pub use queue::QueueConfig;
pub use server::{LogLevel, Mode, ServerConfig};
pub use sidecar::SidecarConfig;

/// Complete hotpod configuration, assembled from per-domain sections.
#[derive(Debug, Clone, Default)]
pub struct HotpodConfig {
    /// HTTP server and feature-gate configuration
    pub server: ServerConfig,

    /// Startup/shutdown lifecycle configuration
    pub lifecycle: LifecycleConfig,

    /// Safety caps for workload executors
    pub limits: LimitsConfig,

    /// Work queue configuration
    pub queue: QueueConfig,

    /// Sidecar-mode resource baselines
    pub sidecar: SidecarConfig,
}

impl HotpodConfig {
    /// Validate all configuration domains.
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.lifecycle.validate()?;
        self.limits.validate()?;
        self.queue.validate()?;
        self.sidecar.validate()?;
        Ok(())
    }
}
