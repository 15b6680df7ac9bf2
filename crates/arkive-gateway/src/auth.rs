// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request authentication for the gateway.
//!
//! - `POST /webhook` must echo the secret registered with Telegram in the
//!   `X-Telegram-Bot-Api-Secret-Token` header when one is configured.
//! - `POST /sweep` requires `Authorization: Bearer <token>` when a sweep
//!   token is configured.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::server::GatewayState;

/// Header Telegram uses to echo the webhook secret.
pub const WEBHOOK_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Whether a webhook request carries the expected secret.
///
/// Always true when no secret is configured.
pub fn webhook_secret_matches(headers: &HeaderMap, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|given| given == expected)
}

/// Middleware guarding the sweep trigger with the configured bearer token.
pub async fn sweep_auth_middleware(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected_token) = state.sweep_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let given = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if given == Some(expected_token) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("rejected sweep trigger with missing or wrong bearer token");
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn no_secret_configured_accepts_anything() {
        assert!(webhook_secret_matches(&HeaderMap::new(), None));
    }

    #[test]
    fn secret_must_match_exactly() {
        let mut headers = HeaderMap::new();
        assert!(!webhook_secret_matches(&headers, Some("s3cret")));

        headers.insert(WEBHOOK_SECRET_HEADER, HeaderValue::from_static("wrong"));
        assert!(!webhook_secret_matches(&headers, Some("s3cret")));

        headers.insert(WEBHOOK_SECRET_HEADER, HeaderValue::from_static("s3cret"));
        assert!(webhook_secret_matches(&headers, Some("s3cret")));
    }
}
