//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use compliance::{ComplianceConfig, FailurePolicy, DEFAULT_SEND_TIMEOUT, DEFAULT_SITE_URL};
use sms_gateway::{GatewayConfig, DEFAULT_BASE_URL};

/// SMS web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Gateway account identifier.
    pub account_sid: String,
    /// Gateway auth secret.
    pub auth_token: String,
    /// Sender number.
    pub from_number: String,
    /// Gateway REST base URL.
    pub api_base_url: String,
    /// Public site for links in message text.
    pub site_url: String,
    /// Behavior when opt status cannot be read.
    pub failure_policy: FailurePolicy,
    /// Bound on each gateway call.
    pub send_timeout: Duration,
    /// Bearer token for the send endpoint.
    pub api_token: Option<String>,
    /// Log outbound messages instead of sending them.
    pub dry_run: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SMS_WEB_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:yup_rsvp.db?mode=rwc` |
    /// | `SMS_ACCOUNT_SID` | Gateway account identifier | (required) |
    /// | `SMS_AUTH_TOKEN` | Gateway auth secret | (required) |
    /// | `SMS_FROM_NUMBER` | Sender number | (required) |
    /// | `SMS_API_BASE_URL` | Gateway REST base URL | `https://api.twilio.com` |
    /// | `SITE_URL` | Public site base URL | `https://yup.rsvp` |
    /// | `SMS_OPT_STATUS_FAILURE` | `open` or `closed` | `open` |
    /// | `SMS_SEND_TIMEOUT_SECS` | Gateway call timeout | `10` |
    /// | `SMS_API_TOKEN` | Bearer token for `/api/sms/send` | (unset) |
    /// | `SMS_DRY_RUN` | Log instead of sending | `false` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("SMS_WEB_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:yup_rsvp.db?mode=rwc".to_string());

        let dry_run = match env::var("SMS_DRY_RUN") {
            Ok(value) => parse_bool(&value).ok_or(ConfigError::InvalidDryRun(value))?,
            Err(_) => false,
        };

        // Gateway credentials are only needed when we actually send.
        let account_sid = required("SMS_ACCOUNT_SID", dry_run)?;
        let auth_token = required("SMS_AUTH_TOKEN", dry_run)?;
        let from_number = required("SMS_FROM_NUMBER", dry_run)?;

        let api_base_url =
            env::var("SMS_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let site_url = env::var("SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.to_string());

        let failure_policy = match env::var("SMS_OPT_STATUS_FAILURE") {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidFailurePolicy(value))?,
            Err(_) => FailurePolicy::default(),
        };

        let send_timeout = match env::var("SMS_SEND_TIMEOUT_SECS") {
            Ok(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidTimeout(value))?,
            Err(_) => DEFAULT_SEND_TIMEOUT,
        };

        let api_token = env::var("SMS_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        Ok(Self {
            addr,
            database_url,
            account_sid,
            auth_token,
            from_number,
            api_base_url,
            site_url,
            failure_policy,
            send_timeout,
            api_token,
            dry_run,
        })
    }

    /// Settings for the compliance gate.
    pub fn compliance(&self) -> ComplianceConfig {
        ComplianceConfig::new(&self.site_url)
            .with_failure_policy(self.failure_policy)
            .with_send_timeout(self.send_timeout)
    }

    /// Settings for the REST gateway client.
    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig::new(&self.account_sid, &self.auth_token, &self.from_number)
            .with_base_url(&self.api_base_url)
    }
}

fn required(name: &'static str, dry_run: bool) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ if dry_run => Ok(String::new()),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid SMS_WEB_ADDR format")]
    InvalidAddr,

    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid SMS_OPT_STATUS_FAILURE value '{0}' (expected open or closed)")]
    InvalidFailurePolicy(String),

    #[error("Invalid SMS_SEND_TIMEOUT_SECS value '{0}'")]
    InvalidTimeout(String),

    #[error("Invalid SMS_DRY_RUN value '{0}'")]
    InvalidDryRun(String),
}
