//! Integration tests for sms-gateway.
//!
//! The live tests require gateway credentials in the environment:
//! `SMS_ACCOUNT_SID`, `SMS_AUTH_TOKEN`, `SMS_FROM_NUMBER` and, for sends,
//! `SMS_TEST_RECIPIENT`.
//!
//! Run only tests that don't need the gateway:
//!   cargo test --test integration_tests
//!
//! Run ignored tests (require credentials):
//!   cargo test --test integration_tests -- --ignored

use sms_gateway::{GatewayConfig, GatewayError, SmsClient, DEFAULT_BASE_URL};
use std::env;
use std::time::Duration;

fn live_config() -> Option<GatewayConfig> {
    let _ = dotenvy::dotenv();
    let sid = env::var("SMS_ACCOUNT_SID").ok()?;
    let token = env::var("SMS_AUTH_TOKEN").ok()?;
    let from = env::var("SMS_FROM_NUMBER").ok()?;
    Some(GatewayConfig::new(sid, token, from))
}

// ============================================================================
// Unit tests (no gateway required)
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_gateway_config_new() {
        let config = GatewayConfig::new("AC123", "secret", "+15550001111");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.account_sid, "AC123");
        assert_eq!(config.from_number, "+15550001111");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_gateway_config_urls() {
        let config = GatewayConfig::new("AC123", "secret", "+15550001111")
            .with_base_url("http://localhost:9999/");
        assert_eq!(
            config.messages_url(),
            "http://localhost:9999/2010-04-01/Accounts/AC123/Messages.json"
        );
        assert_eq!(
            config.account_url(),
            "http://localhost:9999/2010-04-01/Accounts/AC123.json"
        );
    }

    #[test]
    fn test_gateway_config_debug_redacts_token() {
        let config = GatewayConfig::new("AC123", "super-secret", "+15550001111");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_gateway_config_validation() {
        assert!(GatewayConfig::new("AC123", "secret", "+15550001111")
            .validate()
            .is_ok());
        assert!(matches!(
            GatewayConfig::new("", "secret", "+15550001111").validate(),
            Err(GatewayError::Config(_))
        ));
        assert!(matches!(
            GatewayConfig::new("AC123", " ", "+15550001111").validate(),
            Err(GatewayError::Config(_))
        ));
        assert!(matches!(
            GatewayConfig::new("AC123", "secret", "5550001111").validate(),
            Err(GatewayError::Config(_))
        ));
    }
}

mod client_tests {
    use super::*;

    #[test]
    fn test_client_rejects_invalid_config() {
        let result = SmsClient::new(GatewayConfig::new("", "secret", "+15550001111"));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_send_rejects_non_e164_recipient() {
        let client = SmsClient::new(
            GatewayConfig::new("AC123", "secret", "+15550001111")
                .with_base_url("http://127.0.0.1:9"),
        )
        .unwrap();

        let result = client.send_text("5551234567", "Hello").await;
        assert!(matches!(result, Err(GatewayError::InvalidRecipient(_))));
        assert_eq!(client.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_http_error() {
        let client = SmsClient::new(
            GatewayConfig::new("AC123", "secret", "+15550001111")
                .with_base_url("http://127.0.0.1:9")
                .with_request_timeout(Duration::from_secs(2)),
        )
        .unwrap();

        let result = client.send_text("+15551234567", "Hello").await;
        assert!(matches!(result, Err(GatewayError::Http(_))));
    }
}

// ============================================================================
// Live tests (require credentials)
// ============================================================================

#[tokio::test]
#[ignore]
async fn test_live_health_check() {
    let Some(config) = live_config() else {
        eprintln!("Skipping: gateway credentials not set");
        return;
    };

    let client = SmsClient::new(config).unwrap();
    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_live_send() {
    let Some(config) = live_config() else {
        eprintln!("Skipping: gateway credentials not set");
        return;
    };
    let Ok(recipient) = env::var("SMS_TEST_RECIPIENT") else {
        eprintln!("Skipping: SMS_TEST_RECIPIENT not set");
        return;
    };

    let client = SmsClient::connect(config).await.unwrap();
    let result = client
        .send_text(&recipient, "YUP.RSVP gateway test. Reply STOP to opt out.")
        .await
        .unwrap();
    assert!(!result.sid.is_empty());
    assert_eq!(client.sent_count(), 1);
}
