//! Inbound keyword classification.
//!
//! Only a message consisting of exactly one keyword (ignoring case and
//! surrounding whitespace) counts. "please stop" is not an opt-out.

use serde::Serialize;

/// Keywords that unsubscribe the sender.
pub const OPT_OUT_KEYWORDS: &[&str] = &[
    "STOP",
    "STOPALL",
    "UNSUBSCRIBE",
    "CANCEL",
    "END",
    "QUIT",
    "REMOVE",
];

/// Keywords that resubscribe the sender.
pub const OPT_IN_KEYWORDS: &[&str] = &["START", "SUBSCRIBE", "UNSTOP", "BEGIN", "CONTINUE", "RESUME"];

/// Keywords that request the help message.
pub const HELP_KEYWORDS: &[&str] = &["HELP", "INFO", "SUPPORT"];

/// What an inbound message asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundKind {
    OptOut,
    OptIn,
    Help,
    /// Anything that is not exactly a keyword.
    Other,
}

/// Classify an inbound message body.
pub fn classify(body: &str) -> InboundKind {
    let keyword = body.trim().to_uppercase();
    let keyword = keyword.as_str();

    if OPT_OUT_KEYWORDS.contains(&keyword) {
        InboundKind::OptOut
    } else if OPT_IN_KEYWORDS.contains(&keyword) {
        InboundKind::OptIn
    } else if HELP_KEYWORDS.contains(&keyword) {
        InboundKind::Help
    } else {
        InboundKind::Other
    }
}
