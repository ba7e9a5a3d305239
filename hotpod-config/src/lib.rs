//! Configuration for the hotpod load-generation target.
//!
//! Every option comes from a `HOTPOD_*` environment variable with a
//! documented default; configuration is split into domains that each know
//! how to validate themselves.

pub mod domains;
pub mod error;
pub mod loader;
pub mod units;
pub mod validation;

pub use domains::{
    HotpodConfig, LifecycleConfig, LimitsConfig, LogLevel, Mode, QueueConfig, ServerConfig,
    SidecarConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use units::{format_size, parse_cpu, parse_duration, parse_size};
pub use validation::{validate_io_dir_name, Validatable};
