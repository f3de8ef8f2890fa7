//! Configuration types for sms-gateway.

use std::time::Duration;

use crate::error::GatewayError;

/// Default REST API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Configuration for the SMS REST API.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Base URL of the REST API (e.g., "https://api.twilio.com").
    pub base_url: String,
    /// Account identifier.
    pub account_sid: String,
    /// Account auth secret.
    pub auth_token: String,
    /// Sender phone number in E.164 format.
    pub from_number: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl GatewayConfig {
    /// Create a configuration against the default base URL.
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Override the base URL (for a proxy or a local test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the HTTP timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check that all credentials are present.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.account_sid.trim().is_empty() {
            return Err(GatewayError::Config("account SID is empty".to_string()));
        }
        if self.auth_token.trim().is_empty() {
            return Err(GatewayError::Config("auth token is empty".to_string()));
        }
        if !self.from_number.starts_with('+') {
            return Err(GatewayError::Config(format!(
                "sender number must be E.164: {}",
                self.from_number
            )));
        }
        Ok(())
    }

    /// Get the account resource URL, used as a credentials check.
    pub fn account_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}.json",
            self.base_url,
            urlencoding::encode(&self.account_sid)
        )
    }

    /// Get the message creation endpoint URL.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url,
            urlencoding::encode(&self.account_sid)
        )
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from_number", &self.from_number)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
