//! Server startup and shutdown orchestration.
//!
//! On SIGINT/SIGTERM the lifecycle drain protocol runs first — flip the
//! state so `/readyz` starts failing, wait out the pre-stop delay, poll
//! in-flight down to zero — and only then does the HTTP server stop
//! accepting. Worker pool and sidecar runner are stopped after the
//! listener closes.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use hotpod_rest_api::create_app;

use crate::services::ServiceContainer;

/// Extra slack on top of the configured delay + timeout before the drain
/// itself is abandoned.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The hotpod server.
pub struct Server {
    services: ServiceContainer,
}

impl Server {
    pub fn new(services: ServiceContainer) -> Self {
        Self { services }
    }

    /// Run until a shutdown signal arrives and the drain completes.
    pub async fn start(self) -> Result<()> {
        let ctx = self.services.context;
        let config = ctx.config.clone();

        let shutdown_token = CancellationToken::new();

        if let Some(runner) = &ctx.sidecar {
            runner.start(&shutdown_token).await;
        }

        let app = create_app(ctx.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

        info!(
            mode = config.server.mode.as_str(),
            port = config.server.port,
            log_level = config.server.log_level.as_str(),
            startup_delay = ?config.lifecycle.startup_delay,
            startup_jitter = ?config.lifecycle.startup_jitter,
            "server starting"
        );

        let lifecycle = ctx.lifecycle.clone();
        let drain_budget =
            config.lifecycle.shutdown_delay + config.lifecycle.shutdown_timeout + SHUTDOWN_GRACE;
        let drain_token = shutdown_token.clone();
        let graceful = async move {
            shutdown_signal().await;
            info!("shutdown signal received");

            if tokio::time::timeout(drain_budget, lifecycle.shutdown(&drain_token))
                .await
                .is_err()
            {
                warn!("lifecycle drain exceeded its budget");
            }
        };

        axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .with_graceful_shutdown(graceful)
            .await?;

        // Listener closed; tear down background consumers.
        shutdown_token.cancel();
        if let Some(pool) = &ctx.worker_pool {
            pool.stop().await;
        }
        if let Some(runner) = &ctx.sidecar {
            runner.stop().await;
        }

        info!("shutdown complete");
        Ok(())
    }
}

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
