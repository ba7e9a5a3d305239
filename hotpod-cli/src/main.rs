//! The hotpod binary: load config from the environment, initialize
//! logging, and run the server until shutdown.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use hotpod_config::{ConfigLoader, LogLevel};
use hotpod_server::{Server, ServiceContainer};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("hotpod: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = ConfigLoader::new().from_env()?;
    init_tracing(config.server.log_level);

    tracing::info!(version = VERSION, "hotpod starting");

    let services = ServiceContainer::new(config, VERSION)?;
    Server::new(services).start().await
}

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .init();
}
