//! Error types for compliance operations.

use std::time::Duration;

use database::DatabaseError;
use sms_gateway::GatewayError;
use thiserror::Error;

/// Errors that can occur while checking or changing opt status and sending.
#[derive(Debug, Error)]
pub enum ComplianceError {
    /// Persistence failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// A non-database store failed.
    #[error("store error: {0}")]
    Store(String),

    /// The SMS gateway rejected or failed a send.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// A send failed for a reason other than a gateway error.
    ///
    /// `sid` is set when the gateway accepted the message and reported the
    /// failure afterwards.
    #[error("send failed: {reason}")]
    SendFailed { sid: Option<String>, reason: String },

    /// The gateway did not answer in time.
    #[error("gateway call timed out after {0:?}")]
    Timeout(Duration),

    /// Phone number input could not be accepted.
    #[error("{0}")]
    InvalidPhone(String),

    /// A required inbound field was absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl ComplianceError {
    /// Whether this error was caused by caller input rather than a dependency.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ComplianceError::InvalidPhone(_) | ComplianceError::MissingField(_)
        )
    }

    /// Gateway message id of a failed send, when one was assigned.
    pub fn message_sid(&self) -> Option<&str> {
        match self {
            ComplianceError::SendFailed { sid, .. } => sid.as_deref(),
            _ => None,
        }
    }
}

/// Result type for compliance operations.
pub type Result<T> = std::result::Result<T, ComplianceError>;
