//! Bodies for the application's outbound campaigns.
//!
//! Each template is paired with its campaign so the gate can pick the right
//! footer. Bodies never include the footer themselves.

use database::CampaignType;
use serde::{Deserialize, Serialize};

use crate::config::BRAND_NAME;

/// A guest's answer to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpResponse {
    Yup,
    Nope,
    Maybe,
}

impl RsvpResponse {
    fn phrase(&self) -> &'static str {
        match self {
            RsvpResponse::Yup => "is going to",
            RsvpResponse::Nope => "can't make it to",
            RsvpResponse::Maybe => "might come to",
        }
    }
}

/// A message body and the campaign it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatedMessage {
    pub campaign: CampaignType,
    pub body: String,
}

/// Template inputs, one variant per campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageTemplate {
    Verification {
        code: String,
    },
    #[serde(rename_all = "camelCase")]
    Invitation {
        host_name: String,
        event_title: String,
        rsvp_url: String,
    },
    #[serde(rename_all = "camelCase")]
    Reminder {
        event_title: String,
        starts_at: String,
        event_url: String,
    },
    #[serde(rename_all = "camelCase")]
    Notification {
        guest_name: String,
        response: RsvpResponse,
        #[serde(default)]
        guest_count: u32,
        event_title: String,
    },
}

impl MessageTemplate {
    /// Render the template.
    pub fn render(&self) -> TemplatedMessage {
        match self {
            MessageTemplate::Verification { code } => verification_code(code),
            MessageTemplate::Invitation {
                host_name,
                event_title,
                rsvp_url,
            } => event_invitation(host_name, event_title, rsvp_url),
            MessageTemplate::Reminder {
                event_title,
                starts_at,
                event_url,
            } => event_reminder(event_title, starts_at, event_url),
            MessageTemplate::Notification {
                guest_name,
                response,
                guest_count,
                event_title,
            } => rsvp_notification(guest_name, *response, *guest_count, event_title),
        }
    }
}

/// Phone verification code.
pub fn verification_code(code: &str) -> TemplatedMessage {
    TemplatedMessage {
        campaign: CampaignType::Verification,
        body: format!("{BRAND_NAME}: Your verification code is {code}. It expires in 10 minutes."),
    }
}

/// First-contact invitation to an event.
pub fn event_invitation(host_name: &str, event_title: &str, rsvp_url: &str) -> TemplatedMessage {
    TemplatedMessage {
        campaign: CampaignType::Invitation,
        body: format!(
            "{BRAND_NAME}: {host_name} invited you to {event_title}! Reply yup, nope or maybe at {rsvp_url}"
        ),
    }
}

/// Reminder for an event the recipient already answered.
pub fn event_reminder(event_title: &str, starts_at: &str, event_url: &str) -> TemplatedMessage {
    TemplatedMessage {
        campaign: CampaignType::Reminder,
        body: format!("{BRAND_NAME}: Reminder: {event_title} starts {starts_at}. Details: {event_url}"),
    }
}

/// Tells a host that a guest answered.
pub fn rsvp_notification(
    guest_name: &str,
    response: RsvpResponse,
    guest_count: u32,
    event_title: &str,
) -> TemplatedMessage {
    let plus = match (response, guest_count) {
        (RsvpResponse::Nope, _) | (_, 0) => String::new(),
        (_, 1) => " (+1 guest)".to_string(),
        (_, n) => format!(" (+{n} guests)"),
    };

    TemplatedMessage {
        campaign: CampaignType::Notification,
        body: format!("{BRAND_NAME}: {guest_name} {} {event_title}{plus}.", response.phrase()),
    }
}
