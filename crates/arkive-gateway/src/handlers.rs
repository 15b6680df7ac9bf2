// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Handles POST /webhook, POST /sweep, and GET /health.

use arkive_storage::SweepReport;
use arkive_telegram::Update;
use arkive_telegram::handler::classify_update;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::auth::webhook_secret_matches;
use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
}

/// Response body for POST /sweep.
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub due: usize,
    pub deleted: usize,
    pub retried: usize,
    pub dropped: usize,
    pub remaining: usize,
    pub written: bool,
}

impl From<SweepReport> for SweepResponse {
    fn from(report: SweepReport) -> Self {
        Self {
            due: report.due,
            deleted: report.deleted,
            retried: report.retried,
            dropped: report.dropped,
            remaining: report.remaining,
            written: report.written,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// POST /webhook
///
/// Accepts a Telegram update. Anything that is not a recognised update is
/// acknowledged with 200 and no side effects; handler failures yield 500.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !webhook_secret_matches(&headers, state.webhook_secret.as_deref()) {
        warn!("rejected webhook with missing or wrong secret token");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            debug!(error = %e, "ignoring unparseable webhook body");
            return StatusCode::OK.into_response();
        }
    };

    let inbound = classify_update(&update, &state.allowed_users);
    match state.archiver.handle(inbound).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            error!(update_id = update.id.0, error = %e, "webhook handling failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /sweep
///
/// Runs one deletion sweep against the current time.
pub async fn post_sweep(State(state): State<GatewayState>) -> Response {
    let now = chrono::Utc::now().timestamp_millis();
    let notifier = state.archiver.notifier().clone();
    match state.archiver.queue().sweep(now, notifier.as_ref()).await {
        Ok(report) => Json(SweepResponse::from(report)).into_response(),
        Err(e) if e.is_conflict() => {
            warn!(error = %e, "triggered sweep lost a write race");
            error_response(StatusCode::CONFLICT, e.to_string())
        }
        Err(e) => {
            error!(error = %e, "triggered sweep failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
