//! SMS compliance gate for YUP.RSVP.
//!
//! This crate decides whether a phone number may be texted, applies the
//! opt-out/opt-in keywords carriers require, appends the compliance footer
//! to outbound messages and keeps the audit trail in the compliance log.
//!
//! # Architecture
//!
//! ```text
//! Inbound SMS (webhook)              Self-service page
//!          ↓                                 ↓
//! ┌──────────────────────┐        ┌──────────────────────┐
//! │ InboundWebhookProc.  │        │ self_service         │
//! │  log raw, dedupe     │        │  validate US number  │
//! │  classify keyword    │        └──────────┬───────────┘
//! └──────────┬───────────┘                   │
//!            ↓                               ↓
//! ┌─────────────────────────────────────────────────────┐
//! │                  COMPLIANCE GATE                    │
//! │  opt_out / opt_in   → OptStatusStore + log entry    │
//! │  check_compliance   → can_send + footer             │
//! │  send_compliant     → MessageGateway + log entry    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use compliance::{ComplianceConfig, ComplianceGate, FooterOptions, SendOutcome};
//! use database::{CampaignType, Database};
//! use sms_gateway::{GatewayConfig, SmsClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:yup_rsvp.db?mode=rwc").await?;
//!     db.migrate().await?;
//!     let client = SmsClient::new(GatewayConfig::new("AC123", "secret", "+15550001111"))?;
//!
//!     let gate = ComplianceGate::new(Arc::new(db), Arc::new(client), ComplianceConfig::default());
//!     let options = FooterOptions::new(CampaignType::Reminder);
//!
//!     match gate.send_compliant("(555) 123-4567", "Game night starts at 7!", &options).await? {
//!         SendOutcome::Sent { message_sid, .. } => println!("sent {message_sid}"),
//!         SendOutcome::Blocked { reason } => println!("blocked: {reason}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod footer;
pub mod gate;
pub mod gateway;
pub mod keywords;
pub mod memory;
pub mod messages;
pub mod phone;
pub mod self_service;
pub mod store;
pub mod templates;
pub mod webhook;

pub use config::{ComplianceConfig, FailurePolicy, DEFAULT_SEND_TIMEOUT, DEFAULT_SITE_URL};
pub use error::{ComplianceError, Result};
pub use footer::{footer, format_message_with_compliance, FooterOptions};
pub use gate::{ComplianceCheck, ComplianceGate, SendOutcome};
pub use gateway::{LoggingGateway, MessageGateway};
pub use keywords::{classify, InboundKind};
pub use memory::{MemoryStore, RecordingGateway};
pub use self_service::SelfServiceResponse;
pub use store::{ComplianceStats, EventCount, InboundRecord, OptStatusStore, RawInbound};
pub use templates::{MessageTemplate, RsvpResponse, TemplatedMessage};
pub use webhook::{InboundMessage, InboundWebhookProcessor, WebhookOutcome, ACK_RESPONSE};

// Re-export commonly used types from dependencies
pub use database::{CampaignType, ComplianceEventType, ComplianceLogEntry, PhoneOptRecord};
