//! Startup and shutdown lifecycle configuration

use std::time::Duration;

use crate::error::ConfigResult;
use crate::validation::Validatable;

/// Lifecycle configuration
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Delay before the server reports ready
    pub startup_delay: Duration,

    /// Uniform random jitter added to the startup delay
    pub startup_jitter: Duration,

    /// Pre-stop delay after the state flips to shutting down
    pub shutdown_delay: Duration,

    /// Maximum time to wait for in-flight requests to drain
    pub shutdown_timeout: Duration,

    /// Reject new requests immediately once shutting down
    pub drain_immediately: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            startup_delay: Duration::ZERO,
            startup_jitter: Duration::ZERO,
            shutdown_delay: Duration::ZERO,
            shutdown_timeout: default_shutdown_timeout(),
            drain_immediately: false,
        }
    }
}

impl Validatable for LifecycleConfig {
    fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "lifecycle"
    }
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LifecycleConfig::default();
        assert_eq!(config.startup_delay, Duration::ZERO);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(30));
        assert!(!config.drain_immediately);
    }
}
