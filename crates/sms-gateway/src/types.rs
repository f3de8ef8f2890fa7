//! Request and response types for the messages API.

use serde::{Deserialize, Serialize};

/// Parameters for sending a message.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendParams {
    /// Recipient phone number (E.164).
    #[serde(rename = "To")]
    pub to: String,

    /// Sender phone number (E.164).
    #[serde(rename = "From")]
    pub from: String,

    /// The message text.
    #[serde(rename = "Body")]
    pub body: String,
}

impl SendParams {
    /// Create send params for a text message.
    pub fn text(
        to: impl Into<String>,
        from: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
            body: body.into(),
        }
    }
}

/// Result of creating a message.
#[derive(Debug, Clone, Deserialize)]
pub struct SendResult {
    /// Gateway-assigned message id (e.g., "SM...").
    pub sid: String,

    /// Delivery status at creation time ("queued", "accepted", ...).
    #[serde(default)]
    pub status: Option<String>,

    /// Recipient as understood by the gateway.
    #[serde(default)]
    pub to: Option<String>,

    /// Error code reported at creation time, if any.
    #[serde(default)]
    pub error_code: Option<i64>,

    /// Error message reported at creation time, if any.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl SendResult {
    /// Whether the gateway already reports the message as failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.status.as_deref(), Some("failed") | Some("undelivered"))
    }
}

/// Error body returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub more_info: Option<String>,
}
