//! Opt-in/opt-out state per phone number.

use sqlx::SqlitePool;

use crate::models::{OptState, PhoneOptRecord};
use crate::Result;

const RECORD_COLUMNS: &str = "phone_number, opted_out, opt_out_at, opt_out_keyword, \
     opt_in_at, opt_in_keyword, version, created_at, updated_at";

/// Get the opt record for a phone number.
pub async fn get_opt_status(pool: &SqlitePool, phone_number: &str) -> Result<Option<PhoneOptRecord>> {
    let query = format!(
        "SELECT {RECORD_COLUMNS} FROM phone_opt_status WHERE phone_number = ?"
    );

    let record = sqlx::query_as::<_, PhoneOptRecord>(&query)
        .bind(phone_number)
        .fetch_optional(pool)
        .await?;

    Ok(record)
}

/// Move a phone number to `state`, creating its record if needed.
///
/// This is a single upsert, so concurrent transitions on the same number
/// serialize in SQLite and each one bumps `version`. Repeating the current
/// state refreshes the timestamp and keyword.
pub async fn apply_transition(
    pool: &SqlitePool,
    phone_number: &str,
    state: OptState,
    keyword: &str,
) -> Result<PhoneOptRecord> {
    let query = match state {
        OptState::OptedOut => format!(
            r#"
            INSERT INTO phone_opt_status (phone_number, opted_out, opt_out_at, opt_out_keyword)
            VALUES (?, 1, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'), ?)
            ON CONFLICT(phone_number) DO UPDATE SET
                opted_out = 1,
                opt_out_at = excluded.opt_out_at,
                opt_out_keyword = excluded.opt_out_keyword,
                version = phone_opt_status.version + 1,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            RETURNING {RECORD_COLUMNS}
            "#
        ),
        OptState::Subscribed => format!(
            r#"
            INSERT INTO phone_opt_status (phone_number, opted_out, opt_in_at, opt_in_keyword)
            VALUES (?, 0, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'), ?)
            ON CONFLICT(phone_number) DO UPDATE SET
                opted_out = 0,
                opt_in_at = excluded.opt_in_at,
                opt_in_keyword = excluded.opt_in_keyword,
                version = phone_opt_status.version + 1,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            RETURNING {RECORD_COLUMNS}
            "#
        ),
    };

    let record = sqlx::query_as::<_, PhoneOptRecord>(&query)
        .bind(phone_number)
        .bind(keyword)
        .fetch_one(pool)
        .await?;

    tracing::debug!(
        phone = %record.phone_number,
        opted_out = record.opted_out,
        version = record.version,
        "Opt status updated"
    );

    Ok(record)
}

/// Count numbers currently opted out.
pub async fn count_opted_out(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM phone_opt_status WHERE opted_out = 1
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_unknown_number_is_subscribed() {
        let db = test_db().await;

        assert!(get_opt_status(db.pool(), "+15551234567").await.unwrap().is_none());
        assert_eq!(count_opted_out(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_opt_out_creates_record() {
        let db = test_db().await;

        let record = apply_transition(db.pool(), "+15551234567", OptState::OptedOut, "STOP")
            .await
            .unwrap();

        assert!(record.opted_out);
        assert_eq!(record.opt_out_keyword.as_deref(), Some("STOP"));
        assert!(record.opt_out_at.is_some());
        assert!(record.opt_in_at.is_none());
        assert_eq!(record.version, 1);
        let stored = get_opt_status(db.pool(), "+15551234567").await.unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn test_repeated_opt_out_refreshes_keyword() {
        let db = test_db().await;
        let pool = db.pool();

        apply_transition(pool, "+15551234567", OptState::OptedOut, "STOP")
            .await
            .unwrap();
        let record = apply_transition(pool, "+15551234567", OptState::OptedOut, "quit")
            .await
            .unwrap();

        assert!(record.opted_out);
        assert_eq!(record.opt_out_keyword.as_deref(), Some("quit"));
        assert_eq!(record.version, 2);
    }

    #[tokio::test]
    async fn test_opt_in_after_opt_out() {
        let db = test_db().await;
        let pool = db.pool();

        apply_transition(pool, "+15551234567", OptState::OptedOut, "STOP")
            .await
            .unwrap();
        let record = apply_transition(pool, "+15551234567", OptState::Subscribed, "START")
            .await
            .unwrap();

        assert!(!record.opted_out);
        assert_eq!(record.opt_in_keyword.as_deref(), Some("START"));
        // The opt-out fields stay as history.
        assert_eq!(record.opt_out_keyword.as_deref(), Some("STOP"));
        assert_eq!(count_opted_out(pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_opted_out() {
        let db = test_db().await;
        let pool = db.pool();

        apply_transition(pool, "+15550000001", OptState::OptedOut, "STOP")
            .await
            .unwrap();
        apply_transition(pool, "+15550000002", OptState::OptedOut, "END")
            .await
            .unwrap();
        apply_transition(pool, "+15550000003", OptState::Subscribed, "START")
            .await
            .unwrap();

        assert_eq!(count_opted_out(pool).await.unwrap(), 2);
    }
}
