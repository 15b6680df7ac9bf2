// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use arkive_agent::Archiver;
use arkive_core::ArkiveError;
use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::auth::sweep_auth_middleware;
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub archiver: Archiver,
    /// Uploader allowlist; empty admits everyone.
    pub allowed_users: Arc<[String]>,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` value.
    pub webhook_secret: Option<String>,
    /// Bearer token for POST /sweep (None = open).
    pub sweep_token: Option<String>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

/// Gateway server configuration (mirrors GatewayConfig from arkive-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the router:
/// - POST /webhook (webhook secret checked in the handler)
/// - POST /sweep (bearer token middleware)
/// - GET /health
pub fn build_router(state: GatewayState) -> Router {
    let sweep_routes = Router::new()
        .route("/sweep", post(handlers::post_sweep))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            sweep_auth_middleware,
        ))
        .with_state(state.clone());

    Router::new()
        .route("/webhook", post(handlers::post_webhook))
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .merge(sweep_routes)
        .layer(TraceLayer::new_for_http())
}

/// Serves the gateway until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), ArkiveError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ArkiveError::Transport {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| ArkiveError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkive_config::model::BotConfig;
    use arkive_core::{ChatHandle, DeletionJob, MessageHandle};
    use arkive_storage::{DeletionQueue, RecordStore};
    use arkive_test_utils::{MemoryBlobStore, MockNotifier};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state(sweep_token: Option<&str>) -> (GatewayState, Arc<MockNotifier>) {
        let backing = Arc::new(MemoryBlobStore::new());
        let notifier = Arc::new(MockNotifier::new());
        let archiver = Archiver::new(
            RecordStore::new(backing.clone(), "archive.csv"),
            DeletionQueue::new(backing, "deletions.json", 3),
            notifier.clone(),
            &BotConfig::default(),
        );
        let state = GatewayState {
            archiver,
            allowed_users: Arc::from(Vec::new()),
            webhook_secret: Some("s3cret".into()),
            sweep_token: sweep_token.map(str::to_string),
            start_time: Instant::now(),
        };
        (state, notifier)
    }

    #[test]
    fn gateway_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<GatewayState>();
    }

    #[tokio::test]
    async fn health_is_public() {
        let (state, _) = state(Some("tick"));
        let response = build_router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn sweep_requires_bearer_token_when_configured() {
        let (state, _) = state(Some("tick"));
        let app = build_router(state);

        let denied = app
            .clone()
            .oneshot(Request::post("/sweep").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

        let allowed = app
            .oneshot(
                Request::post("/sweep")
                    .header("authorization", "Bearer tick")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn sweep_deletes_due_jobs() {
        let (state, notifier) = state(None);
        state
            .archiver
            .queue()
            .schedule(DeletionJob::new(ChatHandle(1), MessageHandle(2), 0))
            .await
            .unwrap();

        let response = build_router(state)
            .oneshot(Request::post("/sweep").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["deleted"], 1);
        assert_eq!(notifier.deleted().await.len(), 1);
    }
}
