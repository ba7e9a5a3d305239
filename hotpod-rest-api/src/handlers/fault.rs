//! Chaos engineering endpoints.

use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Duration;

use axum::body::StreamBody;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use rand::Rng;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use hotpod_config::format_size;
use hotpod_core::chaos;
use hotpod_web::{ApiError, ApiResult};

use crate::context::AppContext;
use crate::models::fault::{CrashResponse, ErrorRollResponse, HangResponse, OomResponse};
use crate::params::{fmt_duration, parse_bool, parse_duration, parse_float, parse_int, parse_size};

fn chaos_enabled(ctx: &AppContext) -> ApiResult<()> {
    if ctx.config.server.disable_chaos {
        return Err(ApiError::ChaosDisabled);
    }
    Ok(())
}

pub async fn crash(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<CrashResponse>> {
    chaos_enabled(&ctx)?;

    let delay = parse_duration(&params, "delay", Duration::ZERO)?;

    let exit_code = parse_int(&params, "exit_code", 1)?;
    if !(0..=255).contains(&exit_code) {
        return Err(ApiError::invalid_parameter(
            "exit_code must be between 0 and 255",
        ));
    }

    // A zero delay still gets a short grace so this response reaches the
    // client before the process dies.
    let effective_delay = if delay.is_zero() {
        Duration::from_millis(100)
    } else {
        delay
    };
    tokio::spawn(chaos::crash(effective_delay, exit_code as i32));

    Ok(Json(CrashResponse {
        message: "crash scheduled",
        delay: fmt_duration(delay),
        exit_code: exit_code as i32,
        scheduled: true,
    }))
}

pub async fn hang(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    chaos_enabled(&ctx)?;

    let duration = parse_duration(&params, "duration", Duration::ZERO)?;
    let partial = parse_bool(&params, "partial", false)?;

    if partial {
        // Stream a half-finished body, stall, then complete it. The client
        // sees headers and a truncated JSON object for the whole hang.
        let (tx, rx) = tokio::sync::mpsc::channel::<Result<Bytes, Infallible>>(2);

        tokio::spawn(async move {
            if tx
                .send(Ok(Bytes::from_static(b"{\"message\":\"hanging")))
                .await
                .is_err()
            {
                return;
            }

            let token = CancellationToken::new();
            let cancelled = tokio::select! {
                cancelled = chaos::hang(&token, duration) => cancelled,
                _ = tx.closed() => true,
            };

            let suffix: &[u8] = if cancelled {
                b"\",\"cancelled\":true}"
            } else {
                b"\",\"cancelled\":false}"
            };
            let _ = tx.send(Ok(Bytes::from_static(suffix))).await;
        });

        let body = StreamBody::new(ReceiverStream::new(rx));
        return Ok(([(CONTENT_TYPE, "application/json")], body).into_response());
    }

    let token = CancellationToken::new();
    let _cancel_on_drop = token.clone().drop_guard();
    let cancelled = chaos::hang(&token, duration).await;

    Ok(Json(HangResponse {
        message: "hang completed",
        duration: fmt_duration(duration),
        cancelled,
    })
    .into_response())
}

pub async fn oom(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<OomResponse>> {
    chaos_enabled(&ctx)?;

    let rate = parse_size(&params, "rate", 100 << 20)?;
    if rate <= 0 {
        return Err(ApiError::invalid_parameter("rate must be positive"));
    }

    // Fire and forget under a process-lifetime token: the allocations must
    // outlive this request and keep growing until the kernel intervenes.
    tokio::spawn(chaos::oom(CancellationToken::new(), rate));

    Ok(Json(OomResponse {
        message: "OOM simulation started",
        rate: format!("{}/s", format_size(rate)),
        started: true,
    }))
}

pub async fn error(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    chaos_enabled(&ctx)?;

    let rate = parse_float(&params, "rate", 0.5)?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ApiError::invalid_parameter("rate must be between 0 and 1"));
    }

    let status = parse_int(&params, "status", 500)?;
    if !(400..=599).contains(&status) {
        return Err(ApiError::invalid_parameter(
            "status must be between 400 and 599",
        ));
    }

    if rand::thread_rng().gen::<f64>() < rate {
        let status = axum::http::StatusCode::from_u16(status as u16)
            .map_err(|e| ApiError::invalid_parameter(e.to_string()))?;
        let body = ErrorRollResponse {
            injected: true,
            status: Some(status.as_u16()),
            message: "injected error",
        };
        return Ok((status, Json(body)).into_response());
    }

    Ok(Json(ErrorRollResponse {
        injected: false,
        status: None,
        message: "no error injected",
    })
    .into_response())
}
