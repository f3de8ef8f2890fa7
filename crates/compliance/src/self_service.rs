//! Self-service opt-out and opt-in.
//!
//! Both entry points validate the user's input and then call the same gate
//! transitions the webhook uses, so a number opted out from the web page ends
//! in exactly the state a STOP text would leave it in.

use database::PhoneOptRecord;
use serde::Serialize;
use tracing::info;

use crate::error::{ComplianceError, Result};
use crate::gate::ComplianceGate;
use crate::phone::{self, redact};

/// Keyword recorded for opt-outs made from the web page.
pub const WEB_OPT_OUT_KEYWORD: &str = "WEB_OPT_OUT";

/// Keyword recorded for opt-ins made from the web page.
pub const WEB_OPT_IN_KEYWORD: &str = "WEB_OPT_IN";

/// Message shown for input that is not a US phone number.
pub const INVALID_INPUT_MESSAGE: &str = "Please enter a valid 10-digit phone number";

/// Result shape returned to the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfServiceResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SelfServiceResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Check web input and return its E.164 form.
///
/// Accepts 10 digits, or 11 digits with a leading `1`, after separators are
/// dropped. Anything else is rejected.
pub fn validate_phone_input(raw: &str) -> Result<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let has_other = raw
        .chars()
        .any(|c| !(c.is_ascii_digit() || c.is_whitespace() || "+-().".contains(c)));

    let shape_ok = match digits.len() {
        10 => true,
        11 => digits.starts_with('1'),
        _ => false,
    };
    if has_other || !shape_ok {
        return Err(ComplianceError::InvalidPhone(INVALID_INPUT_MESSAGE.to_string()));
    }

    let normalized = phone::normalize(&digits);
    if !phone::is_north_american(&normalized) {
        return Err(ComplianceError::InvalidPhone(INVALID_INPUT_MESSAGE.to_string()));
    }
    Ok(normalized)
}

/// Opt a number out from the web page.
pub async fn opt_out(gate: &ComplianceGate, raw: &str) -> Result<PhoneOptRecord> {
    let phone_number = validate_phone_input(raw)?;
    let record = gate.opt_out(&phone_number, WEB_OPT_OUT_KEYWORD).await?;
    info!(phone = %redact(&phone_number), "Opted out via web");
    Ok(record)
}

/// Opt a number back in from the web page.
pub async fn opt_in(gate: &ComplianceGate, raw: &str) -> Result<PhoneOptRecord> {
    let phone_number = validate_phone_input(raw)?;
    let record = gate.opt_in(&phone_number, WEB_OPT_IN_KEYWORD).await?;
    info!(phone = %redact(&phone_number), "Opted in via web");
    Ok(record)
}
