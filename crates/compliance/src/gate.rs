//! The compliance gate.
//!
//! Every opt-out and opt-in, whether from an inbound keyword or the
//! self-service page, goes through [`ComplianceGate::opt_out`] or
//! [`ComplianceGate::opt_in`], which share one transition routine.

use std::sync::Arc;

use database::{
    ComplianceEventType, ComplianceLogEntry, NewComplianceEvent, OptState, PhoneOptRecord,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::{ComplianceConfig, FailurePolicy};
use crate::error::{ComplianceError, Result};
use crate::footer::{footer, FooterOptions};
use crate::gateway::MessageGateway;
use crate::phone::{self, redact};
use crate::store::{ComplianceStats, InboundRecord, OptStatusStore, RawInbound};

/// Reason given when a number is opted out.
pub const OPTED_OUT_REASON: &str = "Recipient has opted out of SMS messages";

/// Reason given when opt status is unreadable and the policy is fail-closed.
pub const STATUS_UNAVAILABLE_REASON: &str =
    "Opt-out status could not be verified; sending is blocked until it can be";

/// Outcome of a compliance check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceCheck {
    /// Whether the message may be sent.
    pub can_send: bool,
    /// Why the message may not be sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Footer for the message, computed even when blocked.
    pub compliance_text: String,
}

/// Outcome of a gated send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The gateway accepted the message.
    Sent { message_sid: String, body: String },
    /// The gate refused the message.
    Blocked { reason: String },
}

/// Decides whether numbers may be messaged and records every decision.
pub struct ComplianceGate {
    store: Arc<dyn OptStatusStore>,
    gateway: Arc<dyn MessageGateway>,
    config: ComplianceConfig,
}

impl ComplianceGate {
    /// Create a gate over a store and a gateway.
    pub fn new(
        store: Arc<dyn OptStatusStore>,
        gateway: Arc<dyn MessageGateway>,
        config: ComplianceConfig,
    ) -> Self {
        info!(
            gateway = gateway.name(),
            failure_policy = %config.failure_policy,
            send_timeout = ?config.send_timeout,
            "Compliance gate ready"
        );
        Self {
            store,
            gateway,
            config,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    /// Read opt status, applying the failure policy when the read fails.
    ///
    /// Returns `(opted_out, degraded)`.
    async fn resolve_opt_out(&self, phone_number: &str) -> (bool, bool) {
        match self.store.opt_record(phone_number).await {
            Ok(record) => (record.map(|r| r.opted_out).unwrap_or(false), false),
            Err(err) => match self.config.failure_policy {
                FailurePolicy::Open => {
                    error!(
                        phone = %redact(phone_number),
                        error = %err,
                        "COMPLIANCE RISK: opt-out status unreadable, failing open and allowing send"
                    );
                    (false, true)
                }
                FailurePolicy::Closed => {
                    error!(
                        phone = %redact(phone_number),
                        error = %err,
                        "Opt-out status unreadable, failing closed and blocking send"
                    );
                    (true, true)
                }
            },
        }
    }

    /// Whether a number is opted out.
    ///
    /// A failed read follows the configured [`FailurePolicy`].
    pub async fn check_opt_out_status(&self, phone_number: &str) -> bool {
        let phone_number = phone::normalize(phone_number);
        self.resolve_opt_out(&phone_number).await.0
    }

    /// Decide whether a message may go to `phone_number` and build its footer.
    pub async fn check_compliance(
        &self,
        phone_number: &str,
        options: &FooterOptions,
    ) -> ComplianceCheck {
        let phone_number = phone::normalize(phone_number);
        let (opted_out, degraded) = self.resolve_opt_out(&phone_number).await;
        let compliance_text = footer(options, &self.config.site_url);

        let reason = match (opted_out, degraded) {
            (false, _) => None,
            (true, false) => Some(OPTED_OUT_REASON.to_string()),
            (true, true) => Some(STATUS_UNAVAILABLE_REASON.to_string()),
        };

        ComplianceCheck {
            can_send: !opted_out,
            reason,
            compliance_text,
        }
    }

    /// Append to the compliance log. Failures are logged and dropped.
    pub async fn record_compliance_event(&self, event: NewComplianceEvent) {
        if let Err(err) = self.store.append_event(&event).await {
            error!(
                phone = %redact(&event.phone_number),
                event_type = %event.event_type,
                error = %err,
                "Failed to write compliance log entry"
            );
        }
    }

    /// Opt a number out. `keyword` is the text that triggered it.
    pub async fn opt_out(&self, phone_number: &str, keyword: &str) -> Result<PhoneOptRecord> {
        self.transition(phone_number, OptState::OptedOut, keyword).await
    }

    /// Opt a number back in. `keyword` is the text that triggered it.
    pub async fn opt_in(&self, phone_number: &str, keyword: &str) -> Result<PhoneOptRecord> {
        self.transition(phone_number, OptState::Subscribed, keyword).await
    }

    async fn transition(
        &self,
        phone_number: &str,
        state: OptState,
        keyword: &str,
    ) -> Result<PhoneOptRecord> {
        let phone_number = phone::normalize(phone_number);
        let record = self
            .store
            .apply_transition(&phone_number, state, keyword)
            .await?;

        let event_type = match state {
            OptState::OptedOut => ComplianceEventType::OptOut,
            OptState::Subscribed => ComplianceEventType::OptIn,
        };
        self.record_compliance_event(
            NewComplianceEvent::new(&phone_number, event_type).with_content(keyword),
        )
        .await;

        info!(
            phone = %redact(&phone_number),
            opted_out = record.opted_out,
            version = record.version,
            "Opt status changed"
        );

        Ok(record)
    }

    /// Send an application message if the recipient has not opted out.
    ///
    /// The footer for `options` is appended. Successful and failed sends are
    /// both written to the compliance log; blocked sends are not sent.
    pub async fn send_compliant(
        &self,
        phone_number: &str,
        body: &str,
        options: &FooterOptions,
    ) -> Result<SendOutcome> {
        let phone_number = phone::normalize(phone_number);
        if !phone::is_valid_e164(&phone_number) {
            return Err(ComplianceError::InvalidPhone(format!(
                "Not a valid phone number: {}",
                phone_number
            )));
        }

        let check = self.check_compliance(&phone_number, options).await;
        if !check.can_send {
            let reason = check.reason.unwrap_or_else(|| OPTED_OUT_REASON.to_string());
            info!(phone = %redact(&phone_number), reason = %reason, "Send blocked");
            return Ok(SendOutcome::Blocked { reason });
        }

        let full_body = format!("{}{}", body, check.compliance_text);
        let campaign = options.campaign;

        match self.send_with_timeout(&phone_number, &full_body).await {
            Ok(message_sid) => {
                self.record_compliance_event(
                    NewComplianceEvent::new(&phone_number, ComplianceEventType::MessageSent)
                        .with_content(&full_body)
                        .with_campaign(campaign)
                        .with_message_sid(&message_sid),
                )
                .await;
                info!(phone = %redact(&phone_number), campaign = %campaign, sid = %message_sid, "Message sent");
                Ok(SendOutcome::Sent {
                    message_sid,
                    body: full_body,
                })
            }
            Err(err) => {
                let mut event =
                    NewComplianceEvent::new(&phone_number, ComplianceEventType::MessageFailed)
                        .with_content(&full_body)
                        .with_campaign(campaign);
                if let Some(sid) = err.message_sid() {
                    event = event.with_message_sid(sid);
                }
                self.record_compliance_event(event).await;
                warn!(phone = %redact(&phone_number), campaign = %campaign, error = %err, "Message failed");
                Err(err)
            }
        }
    }

    /// Send a reply without consulting opt status.
    ///
    /// Only for answers to inbound keywords, which must reach opted-out
    /// numbers too (the opt-out confirmation itself).
    pub async fn send_reply(&self, to: &str, body: &str) -> Result<String> {
        self.send_with_timeout(to, body).await
    }

    async fn send_with_timeout(&self, to: &str, body: &str) -> Result<String> {
        let timeout = self.config.send_timeout;
        match tokio::time::timeout(timeout, self.gateway.send_sms(to, body)).await {
            Ok(result) => result,
            Err(_) => Err(ComplianceError::Timeout(timeout)),
        }
    }

    /// Log a raw inbound message before it is handled.
    pub async fn record_inbound(&self, inbound: &RawInbound<'_>) -> Result<InboundRecord> {
        self.store.record_inbound(inbound).await
    }

    /// Forget the gateway message id of a logged inbound message so a
    /// redelivery is handled again.
    pub async fn release_inbound(&self, message_sid: &str) -> Result<()> {
        self.store.release_inbound(message_sid).await
    }

    /// Opt-out count and compliance log totals.
    pub async fn stats(&self) -> Result<ComplianceStats> {
        self.store.stats().await
    }

    /// Most recent compliance events for a number, newest first.
    pub async fn recent_events(&self, phone_number: &str, limit: i64) -> Result<Vec<ComplianceLogEntry>> {
        let phone_number = phone::normalize(phone_number);
        self.store.recent_events(&phone_number, limit).await
    }
}

impl std::fmt::Debug for ComplianceGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplianceGate")
            .field("gateway", &self.gateway.name())
            .field("config", &self.config)
            .finish()
    }
}
