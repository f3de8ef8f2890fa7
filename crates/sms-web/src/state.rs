//! Application state shared across handlers.

use std::sync::Arc;

use compliance::{ComplianceGate, InboundWebhookProcessor};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Compliance gate over the opt status store and gateway.
    pub gate: Arc<ComplianceGate>,
    /// Inbound SMS handler.
    pub webhook: InboundWebhookProcessor,
    /// Bearer token required by the send endpoint.
    pub api_token: Option<Arc<str>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(gate: ComplianceGate, api_token: Option<String>) -> Self {
        let gate = Arc::new(gate);
        Self {
            webhook: InboundWebhookProcessor::new(gate.clone()),
            gate,
            api_token: api_token.map(Arc::from),
        }
    }
}
