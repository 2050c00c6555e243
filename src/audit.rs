//! Audit trail of every mutating operation
//!
//! The trail is an ordered list of human-readable records kept in memory and
//! persisted as part of the shutdown snapshot. Recording is best-effort by
//! contract: nothing in the primary transactional flow ever fails because a
//! log entry could not be taken.
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditTrail {
    records: Vec<String>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a trail from previously persisted records.
    pub fn from_records(records: Vec<String>) -> Self {
        Self { records }
    }

    /// Appends a record, stamped with the current UTC date.
    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "audit", "{message}");
        let stamped = format!("{} | {message}", chrono::Utc::now().format("%Y-%m-%d %H:%M"));
        self.records.push(stamped);
    }

    /// The full history in chronological order, oldest first. A UI that
    /// wants the newest entry on top reverses its own copy.
    pub fn history(&self) -> &[String] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
