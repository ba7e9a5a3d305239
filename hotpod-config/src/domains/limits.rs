//! Safety caps for workload executors

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigResult;
use crate::validation::{validate_io_dir_name, Validatable};

/// Fixed base directory for I/O operations.
pub const IO_BASE_PATH: &str = "/tmp";

/// Workload safety limits
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Maximum concurrent operations per class (<= 0 disables the cap)
    pub max_concurrent_ops: i64,

    /// Cap applied to CPU and composite-work durations
    pub max_cpu_duration: Duration,

    /// Cap applied to memory allocations, in bytes
    pub max_memory_size: i64,

    /// Cap applied to I/O operation sizes, in bytes
    pub max_io_size: i64,

    /// Directory name for temp I/O files under the base path
    pub io_dir_name: String,
}

impl LimitsConfig {
    /// Full path for I/O operations (`/tmp/<io_dir_name>`).
    pub fn io_path(&self) -> PathBuf {
        PathBuf::from(IO_BASE_PATH).join(&self.io_dir_name)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_ops: default_max_concurrent_ops(),
            max_cpu_duration: default_max_cpu_duration(),
            max_memory_size: default_max_size(),
            max_io_size: default_max_size(),
            io_dir_name: default_io_dir_name(),
        }
    }
}

impl Validatable for LimitsConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_memory_size < 0 {
            return Err(self.validation_error("max memory size must be non-negative"));
        }
        if self.max_io_size < 0 {
            return Err(self.validation_error("max I/O size must be non-negative"));
        }
        validate_io_dir_name(&self.io_dir_name).map_err(|e| self.validation_error(e))?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "limits"
    }
}

fn default_max_concurrent_ops() -> i64 {
    100
}

fn default_max_cpu_duration() -> Duration {
    Duration::from_secs(60)
}

fn default_max_size() -> i64 {
    1 << 30 // 1GB
}

fn default_io_dir_name() -> String {
    "hotpod".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LimitsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_memory_size, 1 << 30);
        assert_eq!(config.io_path(), PathBuf::from("/tmp/hotpod"));
    }

    #[test]
    fn traversal_dir_name_rejected() {
        let config = LimitsConfig {
            io_dir_name: "../etc".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
