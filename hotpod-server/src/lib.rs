//! Server wiring for hotpod: service construction and startup/shutdown.

pub mod services;
pub mod startup;

pub use services::ServiceContainer;
pub use startup::Server;
