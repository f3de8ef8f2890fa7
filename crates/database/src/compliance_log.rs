//! Append-only compliance audit log.
//!
//! Rows are only ever inserted; the schema rejects updates and deletes.

use sqlx::SqlitePool;

use crate::models::{ComplianceEventType, ComplianceLogEntry, NewComplianceEvent};
use crate::Result;

/// Append an event and return its ID.
pub async fn insert_event(pool: &SqlitePool, event: &NewComplianceEvent) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO compliance_log (phone_number, event_type, message_content, campaign_type, message_sid)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&event.phone_number)
    .bind(event.event_type)
    .bind(&event.message_content)
    .bind(event.campaign_type)
    .bind(&event.message_sid)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Get the most recent events for a phone number.
pub async fn list_for_phone(
    pool: &SqlitePool,
    phone_number: &str,
    limit: i64,
) -> Result<Vec<ComplianceLogEntry>> {
    let rows = sqlx::query_as::<_, ComplianceLogEntry>(
        r#"
        SELECT id, phone_number, event_type, message_content, campaign_type, message_sid, created_at
        FROM compliance_log
        WHERE phone_number = ?
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(phone_number)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count all events grouped by type.
pub async fn count_by_event_type(pool: &SqlitePool) -> Result<Vec<(ComplianceEventType, i64)>> {
    let rows = sqlx::query_as::<_, (ComplianceEventType, i64)>(
        r#"
        SELECT event_type, COUNT(*) as count
        FROM compliance_log
        GROUP BY event_type
        ORDER BY count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CampaignType;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = test_db().await;
        let pool = db.pool();

        let sent = NewComplianceEvent::new("+15551234567", ComplianceEventType::MessageSent)
            .with_content("You're invited!")
            .with_campaign(CampaignType::Invitation)
            .with_message_sid("SM123");
        let first = insert_event(pool, &sent).await.unwrap();
        let second = insert_event(
            pool,
            &NewComplianceEvent::new("+15551234567", ComplianceEventType::OptOut).with_content("STOP"),
        )
        .await
        .unwrap();
        assert!(second > first);

        let entries = list_for_phone(pool, "+15551234567", 10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event_type, ComplianceEventType::OptOut);
        assert_eq!(entries[1].campaign_type, Some(CampaignType::Invitation));
        assert_eq!(entries[1].message_sid.as_deref(), Some("SM123"));

        let limited = list_for_phone(pool, "+15551234567", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, second);
    }

    #[tokio::test]
    async fn test_log_is_append_only() {
        let db = test_db().await;
        let pool = db.pool();

        insert_event(
            pool,
            &NewComplianceEvent::new("+15551234567", ComplianceEventType::OptIn),
        )
        .await
        .unwrap();

        let update = sqlx::query("UPDATE compliance_log SET event_type = 'opt_out'")
            .execute(pool)
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM compliance_log").execute(pool).await;
        assert!(delete.is_err());
    }

    #[tokio::test]
    async fn test_count_by_event_type() {
        let db = test_db().await;
        let pool = db.pool();

        for event_type in [
            ComplianceEventType::OptOut,
            ComplianceEventType::OptOut,
            ComplianceEventType::MessageSent,
        ] {
            insert_event(pool, &NewComplianceEvent::new("+15550000001", event_type))
                .await
                .unwrap();
        }

        let counts = count_by_event_type(pool).await.unwrap();
        assert_eq!(counts[0], (ComplianceEventType::OptOut, 2));
        assert_eq!(counts[1], (ComplianceEventType::MessageSent, 1));
    }
}
