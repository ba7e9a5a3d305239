//! Work queue configuration

use crate::error::ConfigResult;
use crate::validation::Validatable;

/// Queue configuration
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum number of items the queue will hold
    pub max_depth: usize,

    /// Default worker count for /queue/process when not specified
    pub default_workers: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            default_workers: default_workers(),
        }
    }
}

impl Validatable for QueueConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_depth == 0 {
            return Err(self.validation_error("queue max depth must be positive"));
        }
        if self.default_workers == 0 || self.default_workers > 100 {
            return Err(self.validation_error("default workers must be between 1 and 100"));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "queue"
    }
}

fn default_max_depth() -> usize {
    1000
}

fn default_workers() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = QueueConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_depth, 1000);
        assert_eq!(config.default_workers, 2);
    }

    #[test]
    fn zero_depth_rejected() {
        let config = QueueConfig {
            max_depth: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn worker_bounds_enforced() {
        let config = QueueConfig {
            default_workers: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
