//! Replies sent in answer to inbound keywords.

use crate::config::{ComplianceConfig, BRAND_NAME};

/// Confirmation after an opt-out.
pub fn opt_out_confirmation(config: &ComplianceConfig) -> String {
    format!(
        "{BRAND_NAME}: You have been unsubscribed and will no longer receive text messages from us. \
         Reply START to resubscribe. Help: {}",
        config.support_url()
    )
}

/// Confirmation after an opt-in.
pub fn opt_in_confirmation(config: &ComplianceConfig) -> String {
    format!(
        "{BRAND_NAME}: Welcome back! You are subscribed to event invitations and RSVP updates again. \
         Reply HELP for help, STOP to opt out. Msg & data rates may apply. Terms: {}",
        config.terms_url()
    )
}

/// Answer to HELP/INFO/SUPPORT.
pub fn help_message(config: &ComplianceConfig) -> String {
    format!(
        "{BRAND_NAME}: Event invitations and RSVP updates. Reply STOP to opt out, START to opt back in, \
         or manage texts at {} Support: {} Terms: {}",
        config.opt_out_url(),
        config.support_url(),
        config.terms_url()
    )
}

/// Answer to any message that is not a keyword.
pub fn generic_reply(config: &ComplianceConfig) -> String {
    format!(
        "{BRAND_NAME}: This number doesn't read replies. Manage your RSVPs at {}. \
         Reply HELP for help or STOP to opt out.",
        config.site_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opt_out_confirmation_explains_resubscribe() {
        let config = ComplianceConfig::default();
        let text = opt_out_confirmation(&config);
        assert!(text.starts_with("YUP.RSVP:"));
        assert!(text.contains("unsubscribed"));
        assert!(text.contains("START"));
        assert!(text.contains("https://yup.rsvp/support"));
    }

    #[test]
    fn test_help_message_has_both_instructions() {
        let text = help_message(&ComplianceConfig::new("https://example.test"));
        assert!(text.contains("STOP"));
        assert!(text.contains("START"));
        assert!(text.contains("https://example.test/terms"));
        assert!(text.contains("https://example.test/support"));
        assert!(text.contains("https://example.test/sms/opt-out"));
    }

    #[test]
    fn test_generic_reply_mentions_keywords() {
        let text = generic_reply(&ComplianceConfig::default());
        assert!(text.contains("HELP"));
        assert!(text.contains("STOP"));
    }
}
