//! SMS web server for YUP.RSVP.
//!
//! Receives inbound SMS from the gateway, serves the self-service opt-out page
//! and its JSON endpoints, and sends compliance-gated messages for other
//! services.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use compliance::{ComplianceGate, LoggingGateway, MessageGateway};
use database::Database;
use sms_gateway::SmsClient;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

const DEFAULT_LOG_FILTER: &str = "sms_web=info,compliance=info,database=info,sms_gateway=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting SMS web server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Connect to the SMS gateway
    let gateway: Arc<dyn MessageGateway> = if config.dry_run {
        warn!("SMS_DRY_RUN is set, outbound messages will only be logged");
        Arc::new(LoggingGateway)
    } else {
        Arc::new(SmsClient::connect(config.gateway()).await?)
    };

    // Build application state
    let gate = ComplianceGate::new(Arc::new(db.clone()), gateway, config.compliance());
    let state = AppState::new(gate, config.api_token.clone());

    // Build router
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    info!(addr = %config.addr, "SMS web server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("SMS web server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
