use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audit::{ActivationAuditEntry, AuditTrail};
use super::{ActivationError, CodeBroadcaster, GuardViolation, TransitionObserver};
use crate::clock::Clock;
use crate::config::TriageConfig;
use crate::models::{ActivationStatus, CodeKind, TriageLevel, TriageResult};
use crate::ticker::{Deferred, Tick, TickControl};

type SharedObserver = Arc<Mutex<Box<dyn TransitionObserver>>>;

/// Actor recorded for transitions the countdown makes on its own.
pub const SYSTEM_ACTOR: &str = "system";

/// What raised the activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ActivationOrigin {
    Triage { score: u32, triggered_rules: Vec<String> },
    Manual,
}

/// Payload handed to the broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationNotice {
    pub activation_id: Uuid,
    pub code: CodeKind,
    pub responding_team: String,
    pub reason: String,
    pub confirmed_by: String,
    pub confirmed_at: DateTime<Utc>,
}

/// Guarded activation state machine.
///
/// ```text
/// armed --arm--> armed (counting down) --reach 0--> activatable
/// activatable --confirm(reason)--> activating --broadcast ok--> active
/// active --respond--> responding --resolve--> resolved
/// armed/activatable --cancel--> resolved
/// ```
///
/// Dropping an activation that has not reached `resolved` is logged as an
/// error.
pub struct EmergencyActivation {
    id: Uuid,
    code: CodeKind,
    origin: ActivationOrigin,
    status: ActivationStatus,
    countdown_remaining: u32,
    countdown_started: bool,
    reason: Option<String>,
    confirmed_by: Option<String>,
    confirmed_at: Option<DateTime<Utc>>,
    trail: AuditTrail,
    clock: Arc<dyn Clock>,
    observer: Option<SharedObserver>,
    /// Entries not yet delivered to the observer.
    pending: Vec<ActivationAuditEntry>,
    /// Set while the ticker drives the countdown; delivery waits for the lock release.
    deferring: bool,
}

impl EmergencyActivation {
    /// Raise an activation from a classification. Only critical results qualify.
    /// The confirmation delay is `config.activation_countdown_secs`.
    pub fn from_triage(
        result: &TriageResult,
        code: CodeKind,
        config: &TriageConfig,
        actor: &str,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ActivationError> {
        if result.level != TriageLevel::Critical {
            return Err(GuardViolation::NotCritical(result.level).into());
        }
        let origin = ActivationOrigin::Triage {
            score: result.score,
            triggered_rules: result.triggered_rules.clone(),
        };
        Self::create(origin, code, config, actor, clock, "Raised from critical triage result")
    }

    /// Raise an activation by direct staff trigger.
    pub fn manual(
        code: CodeKind,
        config: &TriageConfig,
        actor: &str,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ActivationError> {
        Self::create(ActivationOrigin::Manual, code, config, actor, clock, "Raised manually by staff")
    }

    fn create(
        origin: ActivationOrigin,
        code: CodeKind,
        config: &TriageConfig,
        actor: &str,
        clock: Arc<dyn Clock>,
        note: &str,
    ) -> Result<Self, ActivationError> {
        let countdown_secs = config.activation_countdown_secs;
        if countdown_secs == 0 {
            return Err(GuardViolation::NoConfirmationDelay.into());
        }
        let mut activation = Self {
            id: Uuid::new_v4(),
            code,
            origin,
            status: ActivationStatus::Armed,
            countdown_remaining: countdown_secs,
            countdown_started: false,
            reason: None,
            confirmed_by: None,
            confirmed_at: None,
            trail: AuditTrail::new(),
            clock,
            observer: None,
            pending: Vec::new(),
            deferring: false,
        };
        activation.record(actor, None, ActivationStatus::Armed, note);
        tracing::info!(
            activation_id = %activation.id,
            code = %activation.code,
            countdown = countdown_secs,
            "Emergency activation armed"
        );
        Ok(activation)
    }

    /// Attach the audit callback. Entries appended from now on are delivered.
    /// Countdown entries raised under the ticker arrive after its lock is
    /// released, so the observer may lock the shared activation.
    pub fn with_observer(mut self, observer: impl TransitionObserver + 'static) -> Self {
        self.observer = Some(Arc::new(Mutex::new(Box::new(observer))));
        self
    }

    // ── Read access ─────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn code(&self) -> CodeKind {
        self.code
    }

    pub fn origin(&self) -> &ActivationOrigin {
        &self.origin
    }

    pub fn status(&self) -> ActivationStatus {
        self.status
    }

    pub fn countdown_remaining(&self) -> u32 {
        self.countdown_remaining
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn audit_trail(&self) -> &[ActivationAuditEntry] {
        self.trail.entries()
    }

    /// Countdown has elapsed and the code may be confirmed.
    pub fn is_activatable(&self) -> bool {
        self.status == ActivationStatus::Armed
            && self.countdown_started
            && self.countdown_remaining == 0
    }

    // ── Transitions ─────────────────────────────────────────

    /// Start the confirmation countdown.
    pub fn arm(&mut self, actor: &str) -> Result<(), ActivationError> {
        if self.status != ActivationStatus::Armed || self.countdown_started {
            return Err(self.invalid("arm"));
        }
        self.countdown_started = true;
        let note = format!("Confirmation countdown started ({}s)", self.countdown_remaining);
        self.record(actor, Some(ActivationStatus::Armed), ActivationStatus::Armed, &note);
        Ok(())
    }

    /// Advance the countdown by one second. No-op unless armed and counting.
    pub fn tick(&mut self) {
        if self.status != ActivationStatus::Armed
            || !self.countdown_started
            || self.countdown_remaining == 0
        {
            return;
        }
        self.countdown_remaining -= 1;
        if self.countdown_remaining == 0 {
            self.record(
                SYSTEM_ACTOR,
                Some(ActivationStatus::Armed),
                ActivationStatus::Armed,
                "Confirmation countdown elapsed; activation may be confirmed",
            );
            tracing::info!(activation_id = %self.id, "Emergency activation ready for confirmation");
        }
    }

    /// Confirm the code. Rejected with no state change unless the countdown
    /// has elapsed and `reason` is non-empty.
    pub fn confirm(&mut self, reason: &str, actor: &str) -> Result<(), ActivationError> {
        match self.status {
            ActivationStatus::Armed => {}
            ActivationStatus::Activating
            | ActivationStatus::Active
            | ActivationStatus::Responding => {
                return Err(GuardViolation::AlreadyActivated(self.status).into());
            }
            ActivationStatus::Resolved => return Err(self.invalid("confirm")),
        }
        if !self.countdown_started || self.countdown_remaining > 0 {
            return Err(GuardViolation::CountdownPending {
                remaining: self.countdown_remaining,
            }
            .into());
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(GuardViolation::EmptyReason.into());
        }

        self.reason = Some(reason.to_string());
        self.confirmed_by = Some(actor.to_string());
        self.confirmed_at = Some(self.clock.now());
        self.transition(actor, ActivationStatus::Activating, reason);
        Ok(())
    }

    /// Mark the broadcast as delivered.
    pub fn complete_broadcast(&mut self, actor: &str) -> Result<(), ActivationError> {
        if self.status != ActivationStatus::Activating {
            return Err(self.invalid("complete broadcast"));
        }
        self.transition(actor, ActivationStatus::Active, "Code broadcast to all staff clients");
        Ok(())
    }

    /// Broadcast through `broadcaster`. On failure the activation stays in
    /// `activating` so the broadcast can be retried.
    pub fn dispatch(
        &mut self,
        broadcaster: &dyn CodeBroadcaster,
        actor: &str,
    ) -> Result<(), ActivationError> {
        let notice = self.notice().ok_or_else(|| self.invalid("dispatch"))?;
        if let Err(e) = broadcaster.broadcast(&notice) {
            tracing::error!(activation_id = %self.id, error = %e, "Emergency code broadcast failed");
            return Err(ActivationError::Broadcast(e.0));
        }
        self.complete_broadcast(actor)
    }

    pub fn respond(&mut self, actor: &str) -> Result<(), ActivationError> {
        if self.status != ActivationStatus::Active {
            return Err(self.invalid("respond"));
        }
        self.transition(actor, ActivationStatus::Responding, "Response team on scene");
        Ok(())
    }

    pub fn resolve(&mut self, actor: &str, note: &str) -> Result<(), ActivationError> {
        if self.status != ActivationStatus::Responding {
            return Err(self.invalid("resolve"));
        }
        let note = if note.trim().is_empty() { "Emergency resolved" } else { note.trim() };
        self.transition(actor, ActivationStatus::Resolved, note);
        Ok(())
    }

    /// Stand down before anything was broadcast. Ends in `resolved`.
    pub fn cancel(&mut self, actor: &str, reason: &str) -> Result<(), ActivationError> {
        if self.status != ActivationStatus::Armed {
            return Err(self.invalid("cancel"));
        }
        let reason = if reason.trim().is_empty() {
            "Cancelled before broadcast".to_string()
        } else {
            format!("Cancelled before broadcast: {}", reason.trim())
        };
        self.transition(actor, ActivationStatus::Resolved, &reason);
        Ok(())
    }

    /// Broadcast payload; only available once confirmed.
    pub fn notice(&self) -> Option<ActivationNotice> {
        if self.status != ActivationStatus::Activating {
            return None;
        }
        Some(ActivationNotice {
            activation_id: self.id,
            code: self.code,
            responding_team: self.code.responding_team().to_string(),
            reason: self.reason.clone()?,
            confirmed_by: self.confirmed_by.clone()?,
            confirmed_at: self.confirmed_at?,
        })
    }

    // ── Internals ───────────────────────────────────────────

    fn transition(&mut self, actor: &str, to: ActivationStatus, reason: &str) {
        let from = self.status;
        self.status = to;
        self.record(actor, Some(from), to, reason);
        tracing::info!(
            activation_id = %self.id,
            from = %from,
            to = %to,
            "Emergency activation transition"
        );
    }

    fn record(
        &mut self,
        actor: &str,
        from: Option<ActivationStatus>,
        to: ActivationStatus,
        reason: &str,
    ) {
        let now = self.clock.now();
        let entry = self.trail.append(now, actor, from, to, reason);
        if self.observer.is_none() {
            return;
        }
        self.pending.push(entry.clone());
        if !self.deferring {
            if let Some(work) = self.take_deferred() {
                work();
            }
        }
    }

    fn invalid(&self, action: &'static str) -> ActivationError {
        tracing::error!(
            activation_id = %self.id,
            status = %self.status,
            action,
            "Invalid emergency activation transition"
        );
        ActivationError::InvalidTransition {
            from: self.status,
            action,
        }
    }
}

impl Tick for EmergencyActivation {
    fn on_tick(&mut self) -> TickControl {
        self.deferring = true;
        self.tick();
        self.deferring = false;
        if self.status == ActivationStatus::Armed && self.countdown_remaining > 0 {
            TickControl::Continue
        } else {
            TickControl::Stop
        }
    }

    fn take_deferred(&mut self) -> Option<Deferred> {
        if self.pending.is_empty() {
            return None;
        }
        let observer = self.observer.clone()?;
        let entries = std::mem::take(&mut self.pending);
        let activation_id = self.id;
        Some(Box::new(move || match observer.lock() {
            Ok(mut observer) => {
                for entry in &entries {
                    observer.on_transition(entry);
                }
            }
            Err(_) => {
                tracing::error!(%activation_id, "Transition observer lock poisoned, audit callback dropped");
            }
        }))
    }
}

impl Drop for EmergencyActivation {
    fn drop(&mut self) {
        if self.status != ActivationStatus::Resolved {
            tracing::error!(
                activation_id = %self.id,
                status = %self.status,
                "Emergency activation dropped before it was resolved"
            );
        }
    }
}
