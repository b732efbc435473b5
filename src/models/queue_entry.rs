use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::enums::{QueueStatus, TriageColor};
use super::triage::TriageResult;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Invalid queue transition from {from} to {to}")]
    InvalidTransition { from: QueueStatus, to: QueueStatus },

    #[error("Cannot re-triage an entry that is already {0}")]
    RetriageClosed(QueueStatus),
}

/// A triaged patient on the department board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: Uuid,
    pub patient_id: String,
    pub patient_name: String,
    pub department: String,
    pub arrived_at: DateTime<Utc>,
    pub status: QueueStatus,
    pub result: TriageResult,
    /// Earlier results for this visit, oldest first.
    pub history: Vec<TriageResult>,
}

impl QueueEntry {
    pub fn new(
        patient_id: impl Into<String>,
        patient_name: impl Into<String>,
        department: impl Into<String>,
        arrived_at: DateTime<Utc>,
        result: TriageResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id: patient_id.into(),
            patient_name: patient_name.into(),
            department: department.into(),
            arrived_at,
            status: QueueStatus::Waiting,
            result,
            history: Vec::new(),
        }
    }

    /// Board colour. Staff-recorded death overrides the classifier.
    pub fn acuity(&self) -> TriageColor {
        if self.status == QueueStatus::Deceased {
            TriageColor::Black
        } else {
            self.result.color()
        }
    }

    /// Apply a staff-driven workflow transition.
    pub fn advance(&mut self, next: QueueStatus) -> Result<(), QueueError> {
        if !self.status.can_transition_to(next) {
            return Err(QueueError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        tracing::info!(
            entry_id = %self.id,
            from = %self.status,
            to = %next,
            "Queue entry status changed"
        );
        self.status = next;
        Ok(())
    }

    /// Replace the current result with a fresh classification, keeping the old one.
    pub fn retriage(&mut self, result: TriageResult) -> Result<(), QueueError> {
        if !self.status.is_active() {
            return Err(QueueError::RetriageClosed(self.status));
        }
        tracing::info!(
            entry_id = %self.id,
            from = %self.result.level,
            to = %result.level,
            "Queue entry re-triaged"
        );
        let previous = std::mem::replace(&mut self.result, result);
        self.history.push(previous);
        Ok(())
    }
}
