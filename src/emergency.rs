//! Emergency code activation.
//!
//! Turns a critical triage result (or a manual staff trigger) into a
//! hospital-wide code. A confirmation countdown must elapse and a reason
//! must be given before anything is broadcast. Once broadcasting has begun
//! the activation can no longer be cancelled, and every activation ends in
//! `resolved` with a complete audit trail.

pub mod activation;
pub mod audit;

use thiserror::Error;

use crate::models::{ActivationStatus, TriageLevel};

pub use activation::{ActivationNotice, ActivationOrigin, EmergencyActivation};
pub use audit::{ActivationAuditEntry, AuditTrail};

// ═══════════════════════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════════════════════

/// A recoverable rejection. The UI re-prompts; state is unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardViolation {
    #[error("Confirmation countdown still running ({remaining}s remaining)")]
    CountdownPending { remaining: u32 },

    #[error("A reason is required to activate an emergency code")]
    EmptyReason,

    #[error("Emergency codes require a confirmation countdown of at least one second")]
    NoConfirmationDelay,

    #[error("Only a critical triage result can raise a code (got {0})")]
    NotCritical(TriageLevel),

    #[error("Emergency code already {0}")]
    AlreadyActivated(ActivationStatus),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    #[error(transparent)]
    Guard(#[from] GuardViolation),

    #[error("Invalid activation transition: cannot {action} while {from}")]
    InvalidTransition {
        from: ActivationStatus,
        action: &'static str,
    },

    #[error("Broadcast failed: {0}")]
    Broadcast(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BroadcastError(pub String);

// ═══════════════════════════════════════════════════════════════════════════
// Ports
// ═══════════════════════════════════════════════════════════════════════════

/// Channel that announces an activation to every staff client.
pub trait CodeBroadcaster: Send + Sync {
    fn broadcast(&self, notice: &ActivationNotice) -> Result<(), BroadcastError>;
}

/// Receives every audit entry as it is appended.
pub trait TransitionObserver: Send {
    fn on_transition(&mut self, entry: &ActivationAuditEntry);
}

impl<F> TransitionObserver for F
where
    F: FnMut(&ActivationAuditEntry) + Send,
{
    fn on_transition(&mut self, entry: &ActivationAuditEntry) {
        self(entry)
    }
}
