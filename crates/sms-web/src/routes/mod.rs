//! Route handlers for the SMS web server.

pub mod health;
pub mod opt;
pub mod page;
pub mod send;
pub mod status;
pub mod webhook;

use axum::http::{header, HeaderMap};
use axum::routing::{get, post};
use axum::Router;

use crate::error::WebError;
use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // HTML pages
        .route("/sms/opt-out", get(page::opt_out_page))
        // Health check
        .route("/health", get(health::health))
        // Gateway webhook
        .route(
            "/api/sms/webhook",
            get(health::webhook_liveness).post(webhook::receive),
        )
        // Self-service
        .route("/api/sms/opt-out", post(opt::opt_out))
        .route("/api/sms/opt-in", post(opt::opt_in))
        // Internal API
        .route("/api/sms/status", get(status::status))
        .route("/api/sms/history", get(status::history))
        .route("/api/sms/stats", get(status::stats))
        .route("/api/sms/send", post(send::send))
}

/// Check the bearer token when one is configured.
pub(crate) fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), WebError> {
    let Some(expected) = state.api_token.as_deref() else {
        return Ok(());
    };

    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(WebError::Unauthorized);
    };

    let Ok(value) = value.to_str() else {
        return Err(WebError::Unauthorized);
    };

    let token = value.strip_prefix("Bearer ").unwrap_or(value);
    if token != expected {
        return Err(WebError::Unauthorized);
    }

    Ok(())
}
