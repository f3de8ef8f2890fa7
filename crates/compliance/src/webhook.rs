//! Inbound SMS webhook processing.
//!
//! Every delivery is logged raw before it is classified, so unrecognized
//! messages stay auditable. Once input validation passes, nothing in here
//! fails the webhook: reply and logging failures are logged and dropped, and
//! the gateway always gets its acknowledgment. When an opt change cannot be
//! stored, the message id is released so the gateway's redelivery is handled
//! instead of being dropped as a duplicate.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::error::{ComplianceError, Result};
use crate::gate::ComplianceGate;
use crate::keywords::{classify, InboundKind};
use crate::messages;
use crate::phone::{self, redact};
use crate::store::{InboundRecord, RawInbound};

/// Acknowledgment document returned to the gateway for every delivery.
pub const ACK_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

/// An inbound SMS as posted by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InboundMessage {
    /// Message text.
    #[serde(rename = "Body")]
    pub body: Option<String>,
    /// Sender, raw.
    #[serde(rename = "From")]
    pub from_number: Option<String>,
    /// Our number.
    #[serde(rename = "To")]
    pub to_number: Option<String>,
    /// Gateway message id.
    #[serde(rename = "MessageSid")]
    pub message_sid: Option<String>,
}

impl InboundMessage {
    pub fn new(from_number: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            from_number: Some(from_number.into()),
            ..Default::default()
        }
    }

    pub fn with_message_sid(mut self, sid: impl Into<String>) -> Self {
        self.message_sid = Some(sid.into());
        self
    }
}

/// What happened to an inbound delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Classified and handled.
    Processed(InboundKind),
    /// A redelivery of a message already handled.
    Duplicate,
    /// The opt change could not be stored. A redelivery will be handled again.
    Failed(InboundKind),
}

/// Classifies inbound messages and applies opt transitions.
#[derive(Debug, Clone)]
pub struct InboundWebhookProcessor {
    gate: Arc<ComplianceGate>,
}

impl InboundWebhookProcessor {
    pub fn new(gate: Arc<ComplianceGate>) -> Self {
        Self { gate }
    }

    /// Get the gate this processor drives.
    pub fn gate(&self) -> &Arc<ComplianceGate> {
        &self.gate
    }

    /// Handle one inbound delivery.
    ///
    /// Only missing `Body`/`From` is an error.
    pub async fn process(&self, message: InboundMessage) -> Result<WebhookOutcome> {
        let body = non_empty(message.body.as_deref()).ok_or(ComplianceError::MissingField("Body"))?;
        let from = non_empty(message.from_number.as_deref()).ok_or(ComplianceError::MissingField("From"))?;

        let phone_number = phone::normalize(from);
        let message_sid = non_empty(message.message_sid.as_deref());

        let raw = RawInbound {
            phone_number: &phone_number,
            to_number: non_empty(message.to_number.as_deref()),
            body,
            message_sid,
        };
        match self.gate.record_inbound(&raw).await {
            Ok(InboundRecord::Duplicate) => {
                info!(
                    phone = %redact(&phone_number),
                    sid = message_sid.unwrap_or_default(),
                    "Duplicate webhook delivery, skipping"
                );
                return Ok(WebhookOutcome::Duplicate);
            }
            Ok(InboundRecord::New) => {}
            Err(err) => {
                error!(phone = %redact(&phone_number), error = %err, "Failed to log inbound SMS");
            }
        }

        let kind = classify(body);
        debug!(phone = %redact(&phone_number), kind = ?kind, "Classified inbound SMS");

        let applied = match kind {
            InboundKind::OptOut => self.handle_opt_out(&phone_number, body).await,
            InboundKind::OptIn => self.handle_opt_in(&phone_number, body).await,
            InboundKind::Help => {
                let reply = messages::help_message(self.gate.config());
                self.reply(&phone_number, &reply).await;
                true
            }
            InboundKind::Other => {
                let reply = messages::generic_reply(self.gate.config());
                self.reply(&phone_number, &reply).await;
                true
            }
        };

        if applied {
            return Ok(WebhookOutcome::Processed(kind));
        }

        if let Some(sid) = message_sid {
            if let Err(err) = self.gate.release_inbound(sid).await {
                error!(sid, error = %err, "Failed to release inbound message id");
            }
        }
        Ok(WebhookOutcome::Failed(kind))
    }

    /// Returns whether the opt-out was stored.
    async fn handle_opt_out(&self, phone_number: &str, body: &str) -> bool {
        match self.gate.opt_out(phone_number, body.trim()).await {
            Ok(_) => {
                info!(phone = %redact(phone_number), "Opted out via SMS");
                let reply = messages::opt_out_confirmation(self.gate.config());
                self.reply(phone_number, &reply).await;
                true
            }
            Err(err) => {
                error!(phone = %redact(phone_number), error = %err, "Failed to record SMS opt-out");
                false
            }
        }
    }

    async fn handle_opt_in(&self, phone_number: &str, body: &str) -> bool {
        match self.gate.opt_in(phone_number, body.trim()).await {
            Ok(_) => {
                info!(phone = %redact(phone_number), "Opted in via SMS");
                let reply = messages::opt_in_confirmation(self.gate.config());
                self.reply(phone_number, &reply).await;
                true
            }
            Err(err) => {
                error!(phone = %redact(phone_number), error = %err, "Failed to record SMS opt-in");
                false
            }
        }
    }

    async fn reply(&self, phone_number: &str, text: &str) {
        if let Err(err) = self.gate.send_reply(phone_number, text).await {
            warn!(phone = %redact(phone_number), error = %err, "Failed to send SMS reply");
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComplianceConfig;
    use crate::memory::{MemoryStore, RecordingGateway};
    use database::ComplianceEventType;

    fn processor() -> (InboundWebhookProcessor, Arc<MemoryStore>, Arc<RecordingGateway>) {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        let gate = Arc::new(ComplianceGate::new(
            store.clone(),
            gateway.clone(),
            ComplianceConfig::default(),
        ));
        (InboundWebhookProcessor::new(gate), store, gateway)
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let (processor, store, _) = processor();

        let result = processor
            .process(InboundMessage {
                from_number: Some("+15551234567".to_string()),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(ComplianceError::MissingField("Body"))));

        let result = processor
            .process(InboundMessage {
                body: Some("STOP".to_string()),
                from_number: Some(String::new()),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(ComplianceError::MissingField("From"))));

        assert!(store.inbound_messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_stop_opts_out_and_confirms() {
        let (processor, store, gateway) = processor();

        let outcome = processor
            .process(InboundMessage::new("5551234567", "STOP").with_message_sid("SM1"))
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Processed(InboundKind::OptOut));

        let record = store.record("+15551234567").await.unwrap();
        assert!(record.opted_out);
        assert_eq!(record.opt_out_keyword.as_deref(), Some("STOP"));

        let events = store.events().await;
        assert!(events
            .iter()
            .any(|e| e.event_type == ComplianceEventType::OptOut && e.phone_number == "+15551234567"));

        let sent = gateway.sent_to("+15551234567").await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("unsubscribed"));
    }

    #[tokio::test]
    async fn test_lowercase_keyword_keeps_original_text() {
        let (processor, store, _) = processor();

        processor
            .process(InboundMessage::new("+15551234567", "  stop "))
            .await
            .unwrap();

        let record = store.record("+15551234567").await.unwrap();
        assert!(record.opted_out);
        assert_eq!(record.opt_out_keyword.as_deref(), Some("stop"));
        assert_eq!(store.inbound_messages().await[0].body, "  stop ");
    }

    #[tokio::test]
    async fn test_start_opts_back_in() {
        let (processor, store, gateway) = processor();

        processor
            .process(InboundMessage::new("+15551234567", "STOP"))
            .await
            .unwrap();
        processor
            .process(InboundMessage::new("+15551234567", "Unstop"))
            .await
            .unwrap();

        assert!(!store.record("+15551234567").await.unwrap().opted_out);
        let sent = gateway.sent_to("+15551234567").await;
        assert_eq!(sent.len(), 2);
        assert!(sent[1].body.contains("Welcome back"));
    }

    #[tokio::test]
    async fn test_help_does_not_change_state() {
        let (processor, store, gateway) = processor();

        let outcome = processor
            .process(InboundMessage::new("+15551234567", "help"))
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::Processed(InboundKind::Help));
        assert!(store.record("+15551234567").await.is_none());
        assert!(store.events().await.is_empty());
        assert!(gateway.sent().await[0].body.contains("Reply STOP"));
    }

    #[tokio::test]
    async fn test_random_text_gets_generic_reply_only() {
        let (processor, store, gateway) = processor();

        let outcome = processor
            .process(InboundMessage::new("+15559876543", "RANDOM TEXT"))
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::Processed(InboundKind::Other));
        assert!(store.record("+15559876543").await.is_none());
        assert!(store.events().await.iter().all(|e| !matches!(
            e.event_type,
            ComplianceEventType::OptIn | ComplianceEventType::OptOut
        )));
        assert_eq!(store.inbound_messages().await.len(), 1);
        assert_eq!(gateway.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_sentence_containing_stop_is_not_opt_out() {
        let (processor, store, _) = processor();

        let outcome = processor
            .process(InboundMessage::new("+15551234567", "please stop bugging me"))
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::Processed(InboundKind::Other));
        assert!(store.record("+15551234567").await.is_none());
    }

    #[tokio::test]
    async fn test_redelivery_is_not_processed_twice() {
        let (processor, store, gateway) = processor();
        let message = InboundMessage::new("+15551234567", "STOP").with_message_sid("SM42");

        processor.process(message.clone()).await.unwrap();
        let outcome = processor.process(message).await.unwrap();

        assert_eq!(outcome, WebhookOutcome::Duplicate);
        assert_eq!(
            store
                .events()
                .await
                .iter()
                .filter(|e| e.event_type == ComplianceEventType::OptOut)
                .count(),
            1
        );
        assert_eq!(gateway.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_reply_failure_does_not_fail_processing() {
        let (processor, store, gateway) = processor();
        gateway.set_fail(true);

        let outcome = processor
            .process(InboundMessage::new("+15551234567", "STOP"))
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::Processed(InboundKind::OptOut));
        assert!(store.record("+15551234567").await.unwrap().opted_out);
    }

    #[tokio::test]
    async fn test_store_failure_does_not_fail_processing() {
        let (processor, store, gateway) = processor();
        store.set_fail_writes(true);

        let outcome = processor
            .process(InboundMessage::new("+15551234567", "STOP"))
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::Failed(InboundKind::OptOut));
        // No confirmation when the opt-out could not be stored.
        assert!(gateway.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_stop_redelivery_after_failed_opt_out_is_applied() {
        let (processor, store, gateway) = processor();
        let message = InboundMessage::new("5551234567", "STOP").with_message_sid("SM1");

        store.set_fail_transitions(true);
        let outcome = processor.process(message.clone()).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Failed(InboundKind::OptOut));
        assert!(store.record("+15551234567").await.is_none());

        store.set_fail_transitions(false);
        let outcome = processor.process(message).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Processed(InboundKind::OptOut));
        assert!(store.record("+15551234567").await.unwrap().opted_out);

        // Both deliveries stay in the raw log.
        assert_eq!(store.inbound_messages().await.len(), 2);
        assert_eq!(gateway.sent_to("+15551234567").await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_help_reply_is_still_processed() {
        let (processor, _, gateway) = processor();
        gateway.set_fail(true);

        let message = InboundMessage {
            to_number: Some("+15550001111".to_string()),
            ..InboundMessage::new("+15551234567", "HELP").with_message_sid("SM7")
        };
        let outcome = processor.process(message.clone()).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Processed(InboundKind::Help));
        assert_eq!(processor.process(message).await.unwrap(), WebhookOutcome::Duplicate);
    }
}
