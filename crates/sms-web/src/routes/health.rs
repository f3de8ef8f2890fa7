//! Liveness endpoints.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Health check endpoint.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        message: None,
    })
}

/// Liveness check for the webhook URL.
pub async fn webhook_liveness() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        message: Some("SMS webhook endpoint is active".to_string()),
    })
}
