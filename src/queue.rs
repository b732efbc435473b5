//! Department board ordering.
//!
//! Ordering is recomputed on every refresh and never stored. Primary key is
//! acuity (red, yellow, green, black); ties go to the earlier arrival. The
//! sort is stable, so entries that also share an arrival instant keep their
//! input order.

use serde::{Deserialize, Serialize};

use crate::models::{QueueEntry, TriageColor};

/// Attention order for `entries`. The input is left untouched.
pub fn order(entries: &[QueueEntry]) -> Vec<QueueEntry> {
    let mut ordered = entries.to_vec();
    ordered.sort_by(|a, b| {
        a.acuity()
            .rank()
            .cmp(&b.acuity().rank())
            .then(a.arrived_at.cmp(&b.arrived_at))
    });
    ordered
}

/// Ordered view of the patients still awaiting or receiving care.
pub fn waiting_list(entries: &[QueueEntry]) -> Vec<QueueEntry> {
    let active: Vec<QueueEntry> = entries
        .iter()
        .filter(|e| e.status.is_active())
        .cloned()
        .collect();
    order(&active)
}

/// Per-colour counts and mean score over a board snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatistics {
    pub total: usize,
    pub red: usize,
    pub yellow: usize,
    pub green: usize,
    pub black: usize,
    /// Mean classifier score; `None` for an empty board.
    pub average_score: Option<f64>,
}

impl QueueStatistics {
    pub fn from_entries(entries: &[QueueEntry]) -> Self {
        let mut stats = Self {
            total: entries.len(),
            ..Self::default()
        };
        let mut score_sum: u64 = 0;
        for entry in entries {
            match entry.acuity() {
                TriageColor::Red => stats.red += 1,
                TriageColor::Yellow => stats.yellow += 1,
                TriageColor::Green => stats.green += 1,
                TriageColor::Black => stats.black += 1,
            }
            score_sum += u64::from(entry.result.score);
        }
        if stats.total > 0 {
            stats.average_score = Some(score_sum as f64 / stats.total as f64);
        }
        stats
    }
}
