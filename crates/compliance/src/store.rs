//! Opt status persistence seam.

use async_trait::async_trait;
use database::{
    compliance_log, opt_status, webhook_log, ComplianceEventType, ComplianceLogEntry, Database,
    DatabaseError, NewComplianceEvent, OptState, PhoneOptRecord,
};
use serde::Serialize;

use crate::error::Result;

/// Result of logging a raw inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundRecord {
    /// First delivery of this message.
    New,
    /// The gateway message id was logged before.
    Duplicate,
}

/// A raw inbound message after sender normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInbound<'a> {
    pub phone_number: &'a str,
    pub to_number: Option<&'a str>,
    pub body: &'a str,
    pub message_sid: Option<&'a str>,
}

/// Number of compliance log entries of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCount {
    pub event_type: ComplianceEventType,
    pub count: i64,
}

/// Aggregate view of opt status and the compliance log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceStats {
    /// Numbers currently opted out.
    pub opted_out: i64,
    /// Log entries per event type, most frequent first.
    pub events: Vec<EventCount>,
}

/// Storage for opt records, the compliance log and the raw webhook log.
///
/// Abstracted so the gate can run against SQLite or an in-memory store.
#[async_trait]
pub trait OptStatusStore: Send + Sync {
    /// Read the opt record for an E.164 number.
    async fn opt_record(&self, phone_number: &str) -> Result<Option<PhoneOptRecord>>;

    /// Move a number to `state`, creating the record if needed.
    async fn apply_transition(
        &self,
        phone_number: &str,
        state: OptState,
        keyword: &str,
    ) -> Result<PhoneOptRecord>;

    /// Append to the compliance log.
    async fn append_event(&self, event: &NewComplianceEvent) -> Result<()>;

    /// Log a raw inbound message, detecting redeliveries.
    async fn record_inbound(&self, inbound: &RawInbound<'_>) -> Result<InboundRecord>;

    /// Let a logged message id be accepted again after its handling failed.
    async fn release_inbound(&self, message_sid: &str) -> Result<()>;

    /// Most recent compliance events for a number, newest first.
    async fn recent_events(&self, phone_number: &str, limit: i64) -> Result<Vec<ComplianceLogEntry>>;

    /// Opt-out and log counters.
    async fn stats(&self) -> Result<ComplianceStats>;
}

#[async_trait]
impl OptStatusStore for Database {
    async fn opt_record(&self, phone_number: &str) -> Result<Option<PhoneOptRecord>> {
        Ok(opt_status::get_opt_status(self.pool(), phone_number).await?)
    }

    async fn apply_transition(
        &self,
        phone_number: &str,
        state: OptState,
        keyword: &str,
    ) -> Result<PhoneOptRecord> {
        Ok(opt_status::apply_transition(self.pool(), phone_number, state, keyword).await?)
    }

    async fn append_event(&self, event: &NewComplianceEvent) -> Result<()> {
        compliance_log::insert_event(self.pool(), event).await?;
        Ok(())
    }

    async fn record_inbound(&self, inbound: &RawInbound<'_>) -> Result<InboundRecord> {
        match webhook_log::insert_inbound(
            self.pool(),
            inbound.phone_number,
            inbound.to_number,
            inbound.body,
            inbound.message_sid,
        )
        .await
        {
            Ok(_) => Ok(InboundRecord::New),
            Err(DatabaseError::AlreadyExists { .. }) => Ok(InboundRecord::Duplicate),
            Err(err) => Err(err.into()),
        }
    }

    async fn release_inbound(&self, message_sid: &str) -> Result<()> {
        webhook_log::release_message_sid(self.pool(), message_sid).await?;
        Ok(())
    }

    async fn recent_events(&self, phone_number: &str, limit: i64) -> Result<Vec<ComplianceLogEntry>> {
        Ok(compliance_log::list_for_phone(self.pool(), phone_number, limit).await?)
    }

    async fn stats(&self) -> Result<ComplianceStats> {
        let opted_out = opt_status::count_opted_out(self.pool()).await?;
        let events = compliance_log::count_by_event_type(self.pool())
            .await?
            .into_iter()
            .map(|(event_type, count)| EventCount { event_type, count })
            .collect();
        Ok(ComplianceStats { opted_out, events })
    }
}
