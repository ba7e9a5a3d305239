//! Configuration loading and environment variable handling

use std::str::FromStr;
use std::time::Duration;

use crate::domains::HotpodConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::units::{parse_cpu, parse_duration, parse_size};

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with the default prefix
    pub fn new() -> Self {
        Self {
            prefix: "HOTPOD".to_string(),
        }
    }

    /// Create a new config loader with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env(&self) -> ConfigResult<HotpodConfig> {
        let mut config = HotpodConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    fn apply_env_overrides(&self, config: &mut HotpodConfig) -> ConfigResult<()> {
        self.apply_server_overrides(&mut config.server)?;
        self.apply_lifecycle_overrides(&mut config.lifecycle)?;
        self.apply_limits_overrides(&mut config.limits)?;
        self.apply_queue_overrides(&mut config.queue)?;
        self.apply_sidecar_overrides(&mut config.sidecar)?;
        Ok(())
    }

    fn apply_server_overrides(
        &self,
        config: &mut crate::domains::server::ServerConfig,
    ) -> ConfigResult<()> {
        if let Some(port) = self.get_env_var("PORT") {
            config.port = port
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("invalid {}_PORT: {e}", self.prefix)))?;
        }
        if let Some(level) = self.get_env_var("LOG_LEVEL") {
            config.log_level = FromStr::from_str(&level).map_err(ConfigError::EnvError)?;
        }
        if let Some(mode) = self.get_env_var("MODE") {
            config.mode = FromStr::from_str(&mode).map_err(ConfigError::EnvError)?;
        }
        if let Some(timeout) = self.get_env_var("REQUEST_TIMEOUT") {
            config.request_timeout = self.parse_env_duration("REQUEST_TIMEOUT", &timeout)?;
        }
        if let Some(token) = self.get_env_var("ADMIN_TOKEN") {
            config.admin_token = token;
        }
        if let Some(v) = self.get_env_var("DISABLE_CHAOS") {
            config.disable_chaos = self.parse_env_bool("DISABLE_CHAOS", &v)?;
        }
        if let Some(v) = self.get_env_var("DISABLE_QUEUE") {
            config.disable_queue = self.parse_env_bool("DISABLE_QUEUE", &v)?;
        }
        Ok(())
    }

    fn apply_lifecycle_overrides(
        &self,
        config: &mut crate::domains::lifecycle::LifecycleConfig,
    ) -> ConfigResult<()> {
        if let Some(v) = self.get_env_var("STARTUP_DELAY") {
            config.startup_delay = self.parse_env_duration("STARTUP_DELAY", &v)?;
        }
        if let Some(v) = self.get_env_var("STARTUP_JITTER") {
            config.startup_jitter = self.parse_env_duration("STARTUP_JITTER", &v)?;
        }
        if let Some(v) = self.get_env_var("SHUTDOWN_DELAY") {
            config.shutdown_delay = self.parse_env_duration("SHUTDOWN_DELAY", &v)?;
        }
        if let Some(v) = self.get_env_var("SHUTDOWN_TIMEOUT") {
            config.shutdown_timeout = self.parse_env_duration("SHUTDOWN_TIMEOUT", &v)?;
        }
        if let Some(v) = self.get_env_var("DRAIN_IMMEDIATELY") {
            config.drain_immediately = self.parse_env_bool("DRAIN_IMMEDIATELY", &v)?;
        }
        Ok(())
    }

    fn apply_limits_overrides(
        &self,
        config: &mut crate::domains::limits::LimitsConfig,
    ) -> ConfigResult<()> {
        if let Some(v) = self.get_env_var("MAX_CONCURRENT_OPS") {
            config.max_concurrent_ops = v.parse().map_err(|e| {
                ConfigError::EnvError(format!("invalid {}_MAX_CONCURRENT_OPS: {e}", self.prefix))
            })?;
        }
        if let Some(v) = self.get_env_var("MAX_CPU_DURATION") {
            config.max_cpu_duration = self.parse_env_duration("MAX_CPU_DURATION", &v)?;
        }
        if let Some(v) = self.get_env_var("MAX_MEMORY_SIZE") {
            config.max_memory_size = self.parse_env_size("MAX_MEMORY_SIZE", &v)?;
        }
        if let Some(v) = self.get_env_var("MAX_IO_SIZE") {
            config.max_io_size = self.parse_env_size("MAX_IO_SIZE", &v)?;
        }
        if let Some(v) = self.get_env_var("IO_DIR_NAME") {
            config.io_dir_name = v;
        }
        Ok(())
    }

    fn apply_queue_overrides(
        &self,
        config: &mut crate::domains::queue::QueueConfig,
    ) -> ConfigResult<()> {
        if let Some(v) = self.get_env_var("QUEUE_MAX_DEPTH") {
            config.max_depth = v.parse().map_err(|e| {
                ConfigError::EnvError(format!("invalid {}_QUEUE_MAX_DEPTH: {e}", self.prefix))
            })?;
        }
        if let Some(v) = self.get_env_var("QUEUE_DEFAULT_WORKERS") {
            config.default_workers = v.parse().map_err(|e| {
                ConfigError::EnvError(format!("invalid {}_QUEUE_DEFAULT_WORKERS: {e}", self.prefix))
            })?;
        }
        Ok(())
    }

    fn apply_sidecar_overrides(
        &self,
        config: &mut crate::domains::sidecar::SidecarConfig,
    ) -> ConfigResult<()> {
        if let Some(v) = self.get_env_var("SIDECAR_CPU_BASELINE") {
            config.cpu_baseline = parse_cpu(&v).map_err(|e| {
                ConfigError::EnvError(format!("invalid {}_SIDECAR_CPU_BASELINE: {e}", self.prefix))
            })?;
        }
        if let Some(v) = self.get_env_var("SIDECAR_CPU_JITTER") {
            config.cpu_jitter = parse_cpu(&v).map_err(|e| {
                ConfigError::EnvError(format!("invalid {}_SIDECAR_CPU_JITTER: {e}", self.prefix))
            })?;
        }
        if let Some(v) = self.get_env_var("SIDECAR_MEMORY_BASELINE") {
            config.memory_baseline = self.parse_env_size("SIDECAR_MEMORY_BASELINE", &v)?;
        }
        if let Some(v) = self.get_env_var("SIDECAR_REQUEST_OVERHEAD") {
            config.request_overhead = self.parse_env_duration("SIDECAR_REQUEST_OVERHEAD", &v)?;
        }
        Ok(())
    }

    fn parse_env_duration(&self, name: &str, value: &str) -> ConfigResult<Duration> {
        parse_duration(value)
            .map_err(|e| ConfigError::EnvError(format!("invalid {}_{name}: {e}", self.prefix)))
    }

    fn parse_env_size(&self, name: &str, value: &str) -> ConfigResult<i64> {
        parse_size(value)
            .map_err(|e| ConfigError::EnvError(format!("invalid {}_{name}: {e}", self.prefix)))
    }

    fn parse_env_bool(&self, name: &str, value: &str) -> ConfigResult<bool> {
        match value {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            other => Err(ConfigError::EnvError(format!(
                "invalid {}_{name}: expected boolean, got {other:?}",
                self.prefix
            ))),
        }
    }

    /// Get an environment variable with the configured prefix.
    fn get_env_var(&self, name: &str) -> Option<String> {
        std::env::var(format!("{}_{name}", self.prefix)).ok()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
