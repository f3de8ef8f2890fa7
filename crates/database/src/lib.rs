//! SQLite persistence layer for YUP.RSVP SMS compliance.
//!
//! This crate stores per-number opt-in/opt-out state, the append-only
//! compliance log and the raw inbound webhook log using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{opt_status, Database, OptState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:yup_rsvp.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Record an opt-out
//!     let record =
//!         opt_status::apply_transition(db.pool(), "+15551234567", OptState::OptedOut, "STOP").await?;
//!     assert!(record.opted_out);
//!
//!     db.close().await;
//!     Ok(())
//! }
//! ```

pub mod compliance_log;
pub mod error;
pub mod models;
pub mod opt_status;
pub mod webhook_log;

pub use error::{DatabaseError, Result};
pub use models::{
    CampaignType, ComplianceEventType, ComplianceLogEntry, NewComplianceEvent, OptState,
    PhoneOptRecord, WebhookLogEntry,
};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/yup_rsvp.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    ///
    /// In-memory databases are per-connection, so they always get a single
    /// connection that is never recycled.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { pool_size })
            .acquire_timeout(std::time::Duration::from_secs(30));
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrate_is_repeatable() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();

        assert_eq!(opt_status::count_opted_out(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_opt_out_and_audit_trail() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let pool = db.pool();

        opt_status::apply_transition(pool, "+15551234567", OptState::OptedOut, "STOP")
            .await
            .unwrap();
        compliance_log::insert_event(
            pool,
            &NewComplianceEvent::new("+15551234567", ComplianceEventType::OptOut)
                .with_content("STOP"),
        )
        .await
        .unwrap();

        assert_eq!(opt_status::count_opted_out(pool).await.unwrap(), 1);
        let entries = compliance_log::list_for_phone(pool, "+15551234567", 5)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message_content.as_deref(), Some("STOP"));
    }
}
