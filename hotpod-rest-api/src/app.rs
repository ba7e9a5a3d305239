//! Router assembly.
//!
//! Health, info and metrics are always registered. Workload, queue and
//! chaos routes exist only in app mode; sidecar mode keeps just the control
//! plane plus its per-request overhead layer. Admin routes sit behind the
//! token middleware, and the fault-injection layer wraps workload and queue
//! routes only, so a global rule can never take down the probes or the
//! admin surface that clears it.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use hotpod_config::Mode;
use hotpod_web::middleware::{
    drain_check, inject_faults, log_requests, record_metrics, recovery_layer, request_overhead,
    request_timeout, require_admin, track_requests, AdminToken, FaultLayerState,
};

use crate::context::AppContext;
use crate::handlers;

/// Build the complete application router.
pub fn create_app(ctx: AppContext) -> Router {
    let mut router = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/startupz", get(handlers::startupz))
        .route("/info", get(handlers::info))
        .route("/metrics", get(handlers::metrics));

    if ctx.config.server.mode == Mode::App {
        let fault_state = FaultLayerState {
            injector: ctx.injector.clone(),
            metrics: ctx.metrics.clone(),
        };
        let workload = Router::new()
            .route("/latency", get(handlers::latency))
            .route("/cpu", get(handlers::cpu))
            .route("/memory", get(handlers::memory))
            .route("/io", get(handlers::io))
            .route("/work", get(handlers::work))
            .route("/queue/enqueue", post(handlers::queue::enqueue))
            .route("/queue/process", post(handlers::queue::process))
            .route("/queue/status", get(handlers::queue::status))
            .route("/queue/clear", post(handlers::queue::clear))
            .layer(middleware::from_fn_with_state(fault_state, inject_faults));

        let chaos = Router::new()
            .route("/fault/crash", post(handlers::fault::crash))
            .route("/fault/hang", post(handlers::fault::hang))
            .route("/fault/oom", post(handlers::fault::oom))
            .route("/fault/error", get(handlers::fault::error));

        router = router.merge(workload).merge(chaos);
    }

    let admin = Router::new()
        .route("/admin/ready", post(handlers::admin::ready))
        .route("/admin/gc", post(handlers::admin::gc))
        .route("/admin/config", get(handlers::admin::config))
        .route("/admin/reset", post(handlers::admin::reset))
        .route("/admin/error-rate", post(handlers::admin::error_rate))
        .route("/admin/queue/pause", post(handlers::admin::queue_pause))
        .route("/admin/queue/resume", post(handlers::admin::queue_resume))
        .layer(middleware::from_fn_with_state(
            AdminToken(ctx.config.server.admin_token.clone()),
            require_admin,
        ));
    router = router.merge(admin);

    // Cross-cutting layers; the last layer added runs outermost, so the
    // request passes timeout -> drain -> tracking -> metrics -> recovery ->
    // logging -> handler.
    let mut app = router.with_state(ctx.clone());
    app = app.layer(middleware::from_fn(log_requests));
    app = app.layer(recovery_layer());
    app = app.layer(middleware::from_fn_with_state(
        ctx.metrics.clone(),
        record_metrics,
    ));
    app = app.layer(middleware::from_fn_with_state(
        ctx.lifecycle.clone(),
        track_requests,
    ));
    app = app.layer(middleware::from_fn_with_state(
        ctx.lifecycle.clone(),
        drain_check,
    ));

    if ctx.config.server.mode == Mode::Sidecar && !ctx.config.sidecar.request_overhead.is_zero() {
        app = app.layer(middleware::from_fn_with_state(
            ctx.config.sidecar.request_overhead,
            request_overhead,
        ));
    }

    app.layer(middleware::from_fn_with_state(
        ctx.config.server.request_timeout,
        request_timeout,
    ))
}
