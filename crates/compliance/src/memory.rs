//! In-memory store and recording gateway.
//!
//! Useful for tests and local development. Both can be told to fail so the
//! gate's failure handling can be exercised.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use database::{
    ComplianceEventType, ComplianceLogEntry, NewComplianceEvent, OptState, PhoneOptRecord,
    WebhookLogEntry,
};
use tokio::sync::RwLock;

use crate::error::{ComplianceError, Result};
use crate::gateway::MessageGateway;
use crate::store::{ComplianceStats, EventCount, InboundRecord, OptStatusStore, RawInbound};

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// An [`OptStatusStore`] backed by hash maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, PhoneOptRecord>>,
    events: RwLock<Vec<ComplianceLogEntry>>,
    inbound: RwLock<Vec<WebhookLogEntry>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_transitions: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make opt record reads fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make opt status changes fail while other writes succeed.
    pub fn set_fail_transitions(&self, fail: bool) {
        self.fail_transitions.store(fail, Ordering::SeqCst);
    }

    /// Current record for a number.
    pub async fn record(&self, phone_number: &str) -> Option<PhoneOptRecord> {
        self.records.read().await.get(phone_number).cloned()
    }

    /// Every compliance event, oldest first.
    pub async fn events(&self) -> Vec<ComplianceLogEntry> {
        self.events.read().await.clone()
    }

    /// Every raw inbound message, oldest first.
    pub async fn inbound_messages(&self) -> Vec<WebhookLogEntry> {
        self.inbound.read().await.clone()
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ComplianceError::Store("memory store writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OptStatusStore for MemoryStore {
    async fn opt_record(&self, phone_number: &str) -> Result<Option<PhoneOptRecord>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ComplianceError::Store("memory store reads disabled".to_string()));
        }
        Ok(self.record(phone_number).await)
    }

    async fn apply_transition(
        &self,
        phone_number: &str,
        state: OptState,
        keyword: &str,
    ) -> Result<PhoneOptRecord> {
        self.check_writes()?;
        if self.fail_transitions.load(Ordering::SeqCst) {
            return Err(ComplianceError::Store("memory store transitions disabled".to_string()));
        }

        let timestamp = now();
        let mut records = self.records.write().await;
        let record = records
            .entry(phone_number.to_string())
            .and_modify(|r| r.version += 1)
            .or_insert_with(|| PhoneOptRecord {
                phone_number: phone_number.to_string(),
                opted_out: false,
                opt_out_at: None,
                opt_out_keyword: None,
                opt_in_at: None,
                opt_in_keyword: None,
                version: 1,
                created_at: timestamp.clone(),
                updated_at: timestamp.clone(),
            });

        record.opted_out = state.is_opted_out();
        match state {
            OptState::OptedOut => {
                record.opt_out_at = Some(timestamp.clone());
                record.opt_out_keyword = Some(keyword.to_string());
            }
            OptState::Subscribed => {
                record.opt_in_at = Some(timestamp.clone());
                record.opt_in_keyword = Some(keyword.to_string());
            }
        }
        record.updated_at = timestamp;

        Ok(record.clone())
    }

    async fn append_event(&self, event: &NewComplianceEvent) -> Result<()> {
        self.check_writes()?;

        let mut events = self.events.write().await;
        let id = events.len() as i64 + 1;
        events.push(ComplianceLogEntry {
            id,
            phone_number: event.phone_number.clone(),
            event_type: event.event_type,
            message_content: event.message_content.clone(),
            campaign_type: event.campaign_type,
            message_sid: event.message_sid.clone(),
            created_at: now(),
        });
        Ok(())
    }

    async fn record_inbound(&self, inbound: &RawInbound<'_>) -> Result<InboundRecord> {
        self.check_writes()?;

        let mut messages = self.inbound.write().await;
        if let Some(sid) = inbound.message_sid {
            if messages.iter().any(|m| m.message_sid.as_deref() == Some(sid)) {
                return Ok(InboundRecord::Duplicate);
            }
        }

        let id = messages.len() as i64 + 1;
        messages.push(WebhookLogEntry {
            id,
            phone_number: inbound.phone_number.to_string(),
            to_number: inbound.to_number.map(str::to_string),
            body: inbound.body.to_string(),
            message_sid: inbound.message_sid.map(str::to_string),
            created_at: now(),
        });
        Ok(InboundRecord::New)
    }

    async fn release_inbound(&self, message_sid: &str) -> Result<()> {
        self.check_writes()?;

        let mut messages = self.inbound.write().await;
        for message in messages.iter_mut() {
            if message.message_sid.as_deref() == Some(message_sid) {
                message.message_sid = None;
            }
        }
        Ok(())
    }

    async fn stats(&self) -> Result<ComplianceStats> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ComplianceError::Store("memory store reads disabled".to_string()));
        }

        let opted_out = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.opted_out)
            .count() as i64;

        let mut counts: HashMap<ComplianceEventType, i64> = HashMap::new();
        for event in self.events.read().await.iter() {
            *counts.entry(event.event_type).or_default() += 1;
        }
        let mut events: Vec<EventCount> = counts
            .into_iter()
            .map(|(event_type, count)| EventCount { event_type, count })
            .collect();
        events.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.event_type.as_str().cmp(b.event_type.as_str()))
        });

        Ok(ComplianceStats { opted_out, events })
    }

    async fn recent_events(&self, phone_number: &str, limit: i64) -> Result<Vec<ComplianceLogEntry>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .rev()
            .filter(|e| e.phone_number == phone_number)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

/// A message captured by [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub body: String,
    pub sid: String,
}

/// A [`MessageGateway`] that records messages instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    sent: RwLock<Vec<SentMessage>>,
    next_id: AtomicU64,
    fail: AtomicBool,
    delay: std::sync::Mutex<Option<Duration>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Sleep before each send.
    pub fn set_delay(&self, delay: Option<Duration>) {
        if let Ok(mut guard) = self.delay.lock() {
            *guard = delay;
        }
    }

    /// Every message sent so far, oldest first.
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().await.clone()
    }

    /// Messages sent to one number.
    pub async fn sent_to(&self, to: &str) -> Vec<SentMessage> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|m| m.to == to)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MessageGateway for RecordingGateway {
    async fn send_sms(&self, to: &str, body: &str) -> Result<String> {
        let delay = self.delay.lock().ok().and_then(|guard| *guard);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(ComplianceError::SendFailed {
                sid: None,
                reason: format!("recording gateway refused {}", to),
            });
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let sid = format!("SMTEST{:06}", n);
        self.sent.write().await.push(SentMessage {
            to: to.to_string(),
            body: body.to_string(),
            sid: sid.clone(),
        });
        Ok(sid)
    }

    fn name(&self) -> &str {
        "recording"
    }
}
