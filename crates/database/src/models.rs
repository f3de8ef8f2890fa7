//! Database models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Opt-in/opt-out state for a single phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PhoneOptRecord {
    /// E.164 phone number (e.g., "+15551234567").
    pub phone_number: String,
    /// Whether the number is currently opted out.
    pub opted_out: bool,
    /// When the number last opted out.
    pub opt_out_at: Option<String>,
    /// The literal text that triggered the last opt-out.
    pub opt_out_keyword: Option<String>,
    /// When the number last opted back in.
    pub opt_in_at: Option<String>,
    /// The literal text that triggered the last opt-in.
    pub opt_in_keyword: Option<String>,
    /// Incremented on every transition.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Target state of an opt transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptState {
    /// Messages may be sent.
    Subscribed,
    /// The recipient asked to stop receiving messages.
    OptedOut,
}

impl OptState {
    /// Whether this state blocks outbound messages.
    pub fn is_opted_out(self) -> bool {
        matches!(self, OptState::OptedOut)
    }
}

/// Kind of event recorded in the compliance log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ComplianceEventType {
    OptIn,
    OptOut,
    MessageSent,
    MessageFailed,
}

impl ComplianceEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceEventType::OptIn => "opt_in",
            ComplianceEventType::OptOut => "opt_out",
            ComplianceEventType::MessageSent => "message_sent",
            ComplianceEventType::MessageFailed => "message_failed",
        }
    }
}

impl fmt::Display for ComplianceEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of an outbound message, which decides its disclosure footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CampaignType {
    /// Phone verification codes.
    Verification,
    /// Updates about events the recipient already joined.
    Notification,
    /// First-contact event invitations.
    Invitation,
    /// Upcoming event reminders.
    Reminder,
}

impl CampaignType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignType::Verification => "verification",
            CampaignType::Notification => "notification",
            CampaignType::Invitation => "invitation",
            CampaignType::Reminder => "reminder",
        }
    }
}

impl fmt::Display for CampaignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verification" => Ok(CampaignType::Verification),
            "notification" => Ok(CampaignType::Notification),
            "invitation" => Ok(CampaignType::Invitation),
            "reminder" => Ok(CampaignType::Reminder),
            other => Err(format!("unknown campaign type: {}", other)),
        }
    }
}

/// A row of the append-only compliance log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ComplianceLogEntry {
    /// Auto-incrementing ID.
    pub id: i64,
    /// E.164 phone number.
    pub phone_number: String,
    /// What happened.
    pub event_type: ComplianceEventType,
    /// Message body or inbound keyword, if any.
    pub message_content: Option<String>,
    /// Campaign of the outbound message, if any.
    pub campaign_type: Option<CampaignType>,
    /// Gateway delivery id, for sent/failed events.
    pub message_sid: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// A compliance log entry that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComplianceEvent {
    pub phone_number: String,
    pub event_type: ComplianceEventType,
    pub message_content: Option<String>,
    pub campaign_type: Option<CampaignType>,
    pub message_sid: Option<String>,
}

impl NewComplianceEvent {
    /// Create an event with no optional fields set.
    pub fn new(phone_number: impl Into<String>, event_type: ComplianceEventType) -> Self {
        Self {
            phone_number: phone_number.into(),
            event_type,
            message_content: None,
            campaign_type: None,
            message_sid: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.message_content = Some(content.into());
        self
    }

    pub fn with_campaign(mut self, campaign: CampaignType) -> Self {
        self.campaign_type = Some(campaign);
        self
    }

    pub fn with_message_sid(mut self, sid: impl Into<String>) -> Self {
        self.message_sid = Some(sid.into());
        self
    }
}

/// A raw inbound SMS as delivered by the gateway webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WebhookLogEntry {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Normalized sender number.
    pub phone_number: String,
    /// Our number the message was sent to.
    pub to_number: Option<String>,
    /// Original message body, casing preserved.
    pub body: String,
    /// Gateway message id.
    pub message_sid: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}
