//! SMS REST API HTTP client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::types::{ApiErrorBody, SendParams, SendResult};

/// Client for sending SMS through the REST API.
#[derive(Clone)]
pub struct SmsClient {
    http: Client,
    config: GatewayConfig,
    sent_count: Arc<AtomicU64>,
}

impl SmsClient {
    /// Create a client. No request is made until the first send.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(GatewayError::Http)?;

        Ok(Self {
            http,
            config,
            sent_count: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Create a client and verify the credentials against the API.
    pub async fn connect(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Self::new(config)?;

        if client.health_check().await? {
            info!("Connected to SMS gateway at {}", client.config.base_url);
            Ok(client)
        } else {
            Err(GatewayError::Config(
                "gateway rejected account credentials".to_string(),
            ))
        }
    }

    /// Check that the account resource is reachable with our credentials.
    pub async fn health_check(&self) -> Result<bool, GatewayError> {
        let url = self.config.account_url();
        debug!("Health check: {}", url);

        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await?;

        Ok(resp.status().is_success())
    }

    /// Send a text message from the configured sender number.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<SendResult, GatewayError> {
        let params = SendParams::text(to, &self.config.from_number, body);
        self.send(params).await
    }

    /// Send a message using the full SendParams structure.
    pub async fn send(&self, mut params: SendParams) -> Result<SendResult, GatewayError> {
        if !params.to.starts_with('+') {
            return Err(GatewayError::InvalidRecipient(params.to));
        }
        if params.from.is_empty() {
            params.from = self.config.from_number.clone();
        }

        let url = self.config.messages_url();
        debug!(to = %params.to, "Creating message");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body: Option<ApiErrorBody> = serde_json::from_str(&text).ok();
            let (code, message) = match body {
                Some(body) => (
                    body.code.unwrap_or(-1),
                    body.message.unwrap_or_else(|| text.clone()),
                ),
                None => (-1, text),
            };
            warn!(to = %params.to, status = status.as_u16(), code, "Message rejected by gateway");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let result: SendResult = response.json().await?;
        self.sent_count.fetch_add(1, Ordering::Relaxed);
        debug!(sid = %result.sid, status = ?result.status, "Message created");

        Ok(result)
    }

    /// Number of messages accepted by the gateway since this client was created.
    pub fn sent_count(&self) -> u64 {
        self.sent_count.load(Ordering::Relaxed)
    }

    /// Get the configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl std::fmt::Debug for SmsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsClient")
            .field("config", &self.config)
            .field("sent_count", &self.sent_count())
            .finish()
    }
}
