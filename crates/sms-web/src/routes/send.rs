//! Compliance-gated outbound send endpoint for other services.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use compliance::{CampaignType, FooterOptions, MessageTemplate, SendOutcome};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WebError};
use crate::routes::authorize;
use crate::state::AppState;

/// A message to send.
///
/// Either `message` with `campaignType`, or a `template`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub phone_number: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub campaign_type: Option<CampaignType>,
    #[serde(default)]
    pub template: Option<MessageTemplate>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Send a message if the recipient has not opted out.
pub async fn send(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<SendResponse>> {
    authorize(&state, &headers)?;
    let Json(req) = payload?;

    let (campaign, body) = match (req.template, req.message, req.campaign_type) {
        (Some(template), None, _) => {
            let rendered = template.render();
            (rendered.campaign, rendered.body)
        }
        (None, Some(message), Some(campaign)) if !message.trim().is_empty() => (campaign, message),
        (None, Some(_), None) => {
            return Err(WebError::BadRequest("campaignType is required".to_string()))
        }
        (Some(_), Some(_), _) => {
            return Err(WebError::BadRequest(
                "Send either message or template, not both".to_string(),
            ))
        }
        _ => return Err(WebError::BadRequest("message is required".to_string())),
    };

    info!(campaign = %campaign, "Compliant send requested");

    let outcome = state
        .gate
        .send_compliant(&req.phone_number, &body, &FooterOptions::new(campaign))
        .await?;

    let response = match outcome {
        SendOutcome::Sent { message_sid, .. } => SendResponse {
            sent: true,
            message_sid: Some(message_sid),
            reason: None,
        },
        SendOutcome::Blocked { reason } => SendResponse {
            sent: false,
            message_sid: None,
            reason: Some(reason),
        },
    };
    Ok(Json(response))
}
