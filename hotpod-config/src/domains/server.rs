//! HTTP server and feature-gate configuration

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigResult;
use crate::validation::Validatable;

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Full application: workload, queue, chaos and admin endpoints
    #[default]
    App,
    /// Sidecar: health and admin only, plus a steady background consumer
    Sidecar,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::App => "app",
            Mode::Sidecar => "sidecar",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(Mode::App),
            "sidecar" => Ok(Mode::Sidecar),
            other => Err(format!("invalid mode {other:?}, must be app or sidecar")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!(
                "invalid log level {other:?}, must be one of: debug, info, warn, error"
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// Structured log level
    pub log_level: LogLevel,

    /// Deployment mode
    pub mode: Mode,

    /// Server-side hard timeout applied to every request
    pub request_timeout: Duration,

    /// Admin token; empty means admin endpoints are open
    pub admin_token: String,

    /// Disable the /fault/* chaos endpoints
    pub disable_chaos: bool,

    /// Disable the /queue/* endpoints
    pub disable_queue: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            log_level: LogLevel::default(),
            mode: Mode::default(),
            request_timeout: default_request_timeout(),
            admin_token: String::new(),
            disable_chaos: false,
            disable_queue: false,
        }
    }
}

impl Validatable for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(self.validation_error("port must be between 1 and 65535"));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server"
    }
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(300)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.mode, Mode::App);
        assert_eq!(config.request_timeout, Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_port_rejected() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn mode_and_level_parse() {
        assert_eq!("sidecar".parse::<Mode>().unwrap(), Mode::Sidecar);
        assert!("proxy".parse::<Mode>().is_err());
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("trace".parse::<LogLevel>().is_err());
    }
}
