use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ActivationStatus;

/// One immutable record of an activation transition.
///
/// `from` is `None` only for the creation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationAuditEntry {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub from: Option<ActivationStatus>,
    pub to: ActivationStatus,
    pub reason: String,
}

/// Append-only audit trail. Entries can be read but never edited or removed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditTrail {
    entries: Vec<ActivationAuditEntry>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(
        &mut self,
        timestamp: DateTime<Utc>,
        actor: &str,
        from: Option<ActivationStatus>,
        to: ActivationStatus,
        reason: &str,
    ) -> &ActivationAuditEntry {
        let sequence = self.entries.len() as u64 + 1;
        self.entries.push(ActivationAuditEntry {
            sequence,
            timestamp,
            actor: actor.to_string(),
            from,
            to,
            reason: reason.to_string(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[ActivationAuditEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ActivationAuditEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
