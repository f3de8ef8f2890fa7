//! Self-service opt-out and opt-in endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use compliance::{self_service, SelfServiceResponse};
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;

/// Body of an opt-out or opt-in request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptRequest {
    #[serde(default)]
    pub phone_number: String,
}

/// Opt a number out from the web page.
pub async fn opt_out(
    State(state): State<AppState>,
    payload: std::result::Result<Json<OptRequest>, JsonRejection>,
) -> Result<Json<SelfServiceResponse>> {
    let Json(req) = payload?;
    self_service::opt_out(&state.gate, &req.phone_number).await?;
    Ok(Json(SelfServiceResponse::ok()))
}

/// Opt a number back in from the web page.
pub async fn opt_in(
    State(state): State<AppState>,
    payload: std::result::Result<Json<OptRequest>, JsonRejection>,
) -> Result<Json<SelfServiceResponse>> {
    let Json(req) = payload?;
    self_service::opt_in(&state.gate, &req.phone_number).await?;
    Ok(Json(SelfServiceResponse::ok()))
}
