//! Raw inbound webhook log.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};

/// Record an inbound message.
///
/// Returns `AlreadyExists` when `message_sid` was logged before, which is how
/// gateway redeliveries are detected.
pub async fn insert_inbound(
    pool: &SqlitePool,
    phone_number: &str,
    to_number: Option<&str>,
    body: &str,
    message_sid: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO sms_webhook_log (phone_number, to_number, body, message_sid)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(phone_number)
    .bind(to_number)
    .bind(body)
    .bind(message_sid)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Webhook message",
                    id: message_sid.unwrap_or_default().to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(result.last_insert_rowid())
}

/// Forget the gateway message id of a logged message.
///
/// The raw row stays for audit, but a redelivery of the same id is accepted
/// again. Used when handling the message failed and must be retried.
/// Returns whether a row was released.
pub async fn release_message_sid(pool: &SqlitePool, message_sid: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE sms_webhook_log
        SET message_sid = NULL
        WHERE message_sid = ?
        "#,
    )
    .bind(message_sid)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
