//! Configuration error types

use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable error
    #[error("environment variable error: {0}")]
    EnvError(String),

    /// Domain-specific configuration error
    #[error("invalid configuration in {domain}: {message}")]
    DomainError { domain: String, message: String },
}
