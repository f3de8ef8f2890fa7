//! SMS gateway client library.
//!
//! This crate provides a Rust client for a Twilio-style SMS REST API:
//!
//! - Sending text messages from a configured sender number
//! - Credential checks against the account resource
//!
//! # Example
//!
//! ```no_run
//! use sms_gateway::{GatewayConfig, SmsClient};
//!
//! # async fn example() -> Result<(), sms_gateway::GatewayError> {
//! let config = GatewayConfig::new("AC123", "secret", "+15550001111");
//! let client = SmsClient::connect(config).await?;
//!
//! let result = client.send_text("+15551234567", "Hello!").await?;
//! println!("Queued as {}", result.sid);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::SmsClient;
pub use config::{GatewayConfig, DEFAULT_BASE_URL};
pub use error::GatewayError;
pub use types::{SendParams, SendResult};
