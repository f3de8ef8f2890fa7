//! Outbound SMS seam.

use async_trait::async_trait;
use sms_gateway::{SendResult, SmsClient};

use crate::error::{ComplianceError, Result};

/// Trait for handing a final message body to an SMS channel.
///
/// Abstracted to support different transports (REST gateway, tests, etc.)
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Send `body` to an E.164 number and return the gateway delivery id.
    async fn send_sms(&self, to: &str, body: &str) -> Result<String>;

    /// Get a human-readable name for this gateway.
    fn name(&self) -> &str;
}

#[async_trait]
impl MessageGateway for SmsClient {
    async fn send_sms(&self, to: &str, body: &str) -> Result<String> {
        let result = self.send_text(to, body).await?;
        delivery_sid(result)
    }

    fn name(&self) -> &str {
        "sms-gateway"
    }
}

/// Accept a created message unless the gateway already marked it failed.
///
/// A failed message keeps its sid so the failure can be traced.
fn delivery_sid(result: SendResult) -> Result<String> {
    if result.is_failed() {
        return Err(ComplianceError::SendFailed {
            reason: format!(
                "message {} failed: {}",
                result.sid,
                result.error_message.as_deref().unwrap_or("no reason given")
            ),
            sid: Some(result.sid),
        });
    }

    Ok(result.sid)
}

/// A gateway that logs every message instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct LoggingGateway;

#[async_trait]
impl MessageGateway for LoggingGateway {
    async fn send_sms(&self, to: &str, body: &str) -> Result<String> {
        tracing::info!(to = %crate::phone::redact(to), "[dry-run] SMS: {}", body);
        Ok("dry-run".to_string())
    }

    fn name(&self) -> &str {
        "logging"
    }
}
