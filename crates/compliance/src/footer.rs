//! Regulatory footer appended to outbound messages.
//!
//! Verification and invitation messages reach new or reactivated recipients
//! and carry the terms link and rate disclaimer. Reminders and notifications
//! only get the opt-out line.

use database::CampaignType;

/// Separator placed before each footer part.
pub const FOOTER_DELIMITER: &str = "\n";

/// Default opt-out instruction.
pub const DEFAULT_OPT_OUT_TEXT: &str = "Reply STOP to opt out.";

/// Message and data rate disclaimer.
pub const RATES_DISCLAIMER: &str = "Msg & data rates may apply.";

/// Footer settings for one outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterOptions {
    /// Campaign of the message.
    pub campaign: CampaignType,
    /// Append the opt-out instruction.
    pub include_opt_out: bool,
    /// Append the terms link (verification and invitation only).
    pub include_terms_url: bool,
    /// Replaces [`DEFAULT_OPT_OUT_TEXT`].
    pub custom_opt_out_text: Option<String>,
}

impl FooterOptions {
    /// Options with every part enabled.
    pub fn new(campaign: CampaignType) -> Self {
        Self {
            campaign,
            include_opt_out: true,
            include_terms_url: true,
            custom_opt_out_text: None,
        }
    }

    pub fn without_opt_out(mut self) -> Self {
        self.include_opt_out = false;
        self
    }

    pub fn without_terms_url(mut self) -> Self {
        self.include_terms_url = false;
        self
    }

    pub fn with_opt_out_text(mut self, text: impl Into<String>) -> Self {
        self.custom_opt_out_text = Some(text.into());
        self
    }
}

/// Whether a campaign carries the terms link and rate disclaimer.
pub fn requires_full_disclosure(campaign: CampaignType) -> bool {
    matches!(
        campaign,
        CampaignType::Verification | CampaignType::Invitation
    )
}

/// Build the footer for `options`. Terms links point at `site_url`.
pub fn footer(options: &FooterOptions, site_url: &str) -> String {
    let mut text = String::new();

    if options.include_opt_out {
        let opt_out = options
            .custom_opt_out_text
            .as_deref()
            .unwrap_or(DEFAULT_OPT_OUT_TEXT);
        text.push_str(FOOTER_DELIMITER);
        text.push_str(opt_out);
    }

    let full_disclosure = requires_full_disclosure(options.campaign);

    if options.include_terms_url && full_disclosure {
        text.push_str(FOOTER_DELIMITER);
        text.push_str(&format!("Terms: {}/terms", site_url.trim_end_matches('/')));
    }

    if full_disclosure {
        text.push_str(FOOTER_DELIMITER);
        text.push_str(RATES_DISCLAIMER);
    }

    text
}

/// Append the footer for `options` to `body`.
pub fn format_message_with_compliance(body: &str, options: &FooterOptions, site_url: &str) -> String {
    format!("{}{}", body, footer(options, site_url))
}
