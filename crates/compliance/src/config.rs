//! Compliance configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default public site used in message links.
pub const DEFAULT_SITE_URL: &str = "https://yup.rsvp";

/// Default bound on a single gateway call.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Brand prefix on every message we send.
pub const BRAND_NAME: &str = "YUP.RSVP";

/// What to do when the opt status of a number cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Treat the number as subscribed and keep sending.
    #[default]
    Open,
    /// Treat the number as opted out and block the send.
    Closed,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Open => f.write_str("open"),
            FailurePolicy::Closed => f.write_str("closed"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" | "fail-open" | "fail_open" => Ok(FailurePolicy::Open),
            "closed" | "fail-closed" | "fail_closed" => Ok(FailurePolicy::Closed),
            other => Err(format!("unknown failure policy: {}", other)),
        }
    }
}

/// Settings shared by the gate, the webhook processor and message text.
#[derive(Debug, Clone)]
pub struct ComplianceConfig {
    /// Public site base URL, without trailing slash.
    pub site_url: String,
    /// Behavior when opt status is unreadable.
    pub failure_policy: FailurePolicy,
    /// Bound on each gateway call.
    pub send_timeout: Duration,
}

impl ComplianceConfig {
    /// Create a configuration for the given public site.
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Terms of service page.
    pub fn terms_url(&self) -> String {
        format!("{}/terms", self.site_url)
    }

    /// Support page.
    pub fn support_url(&self) -> String {
        format!("{}/support", self.site_url)
    }

    /// Self-service opt-out page.
    pub fn opt_out_url(&self) -> String {
        format!("{}/sms/opt-out", self.site_url)
    }
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            failure_policy: FailurePolicy::default(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}
