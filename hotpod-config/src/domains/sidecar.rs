//! Sidecar-mode resource baselines

use std::time::Duration;

use crate::error::ConfigResult;
use crate::validation::Validatable;

/// Sidecar configuration. Only consulted when the server runs in sidecar
/// mode, where it drives a steady background CPU/memory consumer standing in
/// for a service-mesh proxy.
#[derive(Debug, Clone)]
pub struct SidecarConfig {
    /// CPU time burned each one-second tick
    pub cpu_baseline: Duration,

    /// Uniform jitter applied to the baseline each tick
    pub cpu_jitter: Duration,

    /// Steady memory held while the runner is active, in bytes
    pub memory_baseline: i64,

    /// Extra CPU burned per incoming request
    pub request_overhead: Duration,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            cpu_baseline: default_cpu_baseline(),
            cpu_jitter: default_cpu_jitter(),
            memory_baseline: default_memory_baseline(),
            request_overhead: Duration::ZERO,
        }
    }
}

impl Validatable for SidecarConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.cpu_baseline > Duration::from_secs(1) {
            return Err(self.validation_error("CPU baseline cannot exceed 1s per tick"));
        }
        if self.memory_baseline < 0 {
            return Err(self.validation_error("memory baseline must be non-negative"));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "sidecar"
    }
}

fn default_cpu_baseline() -> Duration {
    Duration::from_millis(100)
}

fn default_cpu_jitter() -> Duration {
    Duration::from_millis(10)
}

fn default_memory_baseline() -> i64 {
    50 << 20 // 50MB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SidecarConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cpu_baseline, Duration::from_millis(100));
        assert_eq!(config.memory_baseline, 50 << 20);
    }

    #[test]
    fn oversized_baseline_rejected() {
        let config = SidecarConfig {
            cpu_baseline: Duration::from_secs(2),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
