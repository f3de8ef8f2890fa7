//! Opt status and compliance history lookups.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use compliance::{phone, ComplianceLogEntry, ComplianceStats};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WebError};
use crate::routes::authorize;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MAX_HISTORY_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    #[serde(default)]
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub phone_number: String,
    pub opted_out: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    #[serde(default)]
    pub phone_number: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub phone_number: String,
    pub events: Vec<ComplianceLogEntry>,
}

/// Whether a number is opted out, under the configured failure policy.
pub async fn status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>> {
    let phone_number = normalized(&query.phone_number)?;
    let opted_out = state.gate.check_opt_out_status(&phone_number).await;
    Ok(Json(StatusResponse {
        phone_number,
        opted_out,
    }))
}

/// Recent compliance events for a number, newest first.
pub async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    authorize(&state, &headers)?;

    let phone_number = normalized(&query.phone_number)?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let events = state.gate.recent_events(&phone_number, limit).await?;

    Ok(Json(HistoryResponse {
        phone_number,
        events,
    }))
}

/// Opt-out count and compliance log totals.
pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ComplianceStats>> {
    authorize(&state, &headers)?;
    Ok(Json(state.gate.stats().await?))
}

fn normalized(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(WebError::BadRequest("phoneNumber is required".to_string()));
    }
    let phone_number = phone::normalize(raw);
    if !phone::is_valid_e164(&phone_number) {
        return Err(WebError::BadRequest(format!(
            "Not a valid phone number: {}",
            raw.trim()
        )));
    }
    Ok(phone_number)
}
