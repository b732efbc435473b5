//! The single in-progress triage interaction.
//!
//! Owns the SLA timer and the draft vitals, re-classifies on every change,
//! and hands the finished record to a [`SubmissionPort`]. A failed
//! submission is reported verbatim and leaves the session untouched so the
//! nurse can retry without re-entering anything.

use std::sync::Arc;

use thiserror::Error;

use crate::clock::Clock;
use crate::config::TriageConfig;
use crate::models::{QueueEntry, QueueError, TriageResult, ValidationError, VitalSignsInput};
use crate::sla_timer::{SlaThresholds, TimerError, TimerState, TriageSlaTimer};
use crate::ticker::{Deferred, Tick, TickControl};

use super::classifier::classify;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Vital signs invalid: {0}")]
    Validation(#[from] ValidationError),

    #[error("No triage result to submit; enter a complete set of vital signs first")]
    NotClassified,

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Timer(#[from] TimerError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SubmissionError(pub String);

/// Persists a queue entry (new or re-triaged) to the department board.
pub trait SubmissionPort: Send + Sync {
    fn submit(&self, entry: &QueueEntry) -> Result<(), SubmissionError>;
}

pub struct TriageSession {
    timer: TriageSlaTimer,
    draft: VitalSignsInput,
    result: Option<TriageResult>,
    clock: Arc<dyn Clock>,
}

impl TriageSession {
    pub fn new(thresholds: SlaThresholds, clock: Arc<dyn Clock>) -> Self {
        Self::with_timer(TriageSlaTimer::new(thresholds), clock)
    }

    /// Session with SLA thresholds taken from `config`.
    pub fn from_config(config: &TriageConfig, clock: Arc<dyn Clock>) -> Result<Self, SessionError> {
        Ok(Self::new(SlaThresholds::from_config(config)?, clock))
    }

    /// Use a preconfigured timer, e.g. one with a threshold observer attached.
    pub fn with_timer(timer: TriageSlaTimer, clock: Arc<dyn Clock>) -> Self {
        Self {
            timer,
            draft: VitalSignsInput::default(),
            result: None,
            clock,
        }
    }

    /// Open the interaction and start the SLA timer.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        self.timer.start()?;
        tracing::info!(timer_id = %self.timer.id(), "Triage session started");
        Ok(())
    }

    pub fn draft(&self) -> &VitalSignsInput {
        &self.draft
    }

    pub fn result(&self) -> Option<&TriageResult> {
        self.result.as_ref()
    }

    pub fn timer(&self) -> &TriageSlaTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut TriageSlaTimer {
        &mut self.timer
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    /// Replace the draft and re-classify. An incomplete or implausible draft
    /// clears the previous result rather than leaving a stale level on screen.
    pub fn update_vitals(&mut self, input: VitalSignsInput) -> Result<&TriageResult, SessionError> {
        self.draft = input;
        match classify(&self.draft) {
            Ok(result) => {
                tracing::debug!(
                    level = %result.level,
                    rules = result.triggered_rules.len(),
                    "Draft vitals classified"
                );
                Ok(&*self.result.insert(result))
            }
            Err(e) => {
                self.result = None;
                Err(e.into())
            }
        }
    }

    /// Submit the classified draft as a new queue entry. On success the
    /// session is cleared and the timer reset for the next patient.
    pub fn submit(
        &mut self,
        patient_id: &str,
        patient_name: &str,
        department: &str,
        port: &dyn SubmissionPort,
    ) -> Result<QueueEntry, SessionError> {
        let result = self.result.clone().ok_or(SessionError::NotClassified)?;
        let entry = QueueEntry::new(patient_id, patient_name, department, self.clock.now(), result);

        if let Err(e) = port.submit(&entry) {
            tracing::error!(entry_id = %entry.id, error = %e, "Triage submission failed");
            return Err(SessionError::Submission(e.0));
        }

        tracing::info!(
            entry_id = %entry.id,
            level = %entry.result.level,
            elapsed = self.timer.elapsed_seconds(),
            "Triage submitted"
        );
        self.clear();
        Ok(entry)
    }

    /// Apply the current result to an existing entry. The previous result
    /// moves to the entry's history. `entry` is only changed once the port
    /// has accepted the update.
    pub fn retriage(
        &mut self,
        entry: &mut QueueEntry,
        port: &dyn SubmissionPort,
    ) -> Result<(), SessionError> {
        let result = self.result.clone().ok_or(SessionError::NotClassified)?;
        let mut updated = entry.clone();
        updated.retriage(result)?;

        if let Err(e) = port.submit(&updated) {
            tracing::error!(entry_id = %entry.id, error = %e, "Re-triage submission failed");
            return Err(SessionError::Submission(e.0));
        }

        *entry = updated;
        self.clear();
        Ok(())
    }

    /// Discard the draft and result and return the timer to idle.
    pub fn clear(&mut self) {
        self.draft = VitalSignsInput::default();
        self.result = None;
        self.timer.reset();
    }
}

impl Tick for TriageSession {
    fn on_tick(&mut self) -> TickControl {
        self.timer.on_tick()
    }

    fn take_deferred(&mut self) -> Option<Deferred> {
        self.timer.take_deferred()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::clock::ManualClock;
    use crate::models::{QueueStatus, TriageLevel, VitalKind};
    use crate::sla_timer::TimerPhase;
    use crate::ticker::{spawn_configured_ticker, spawn_ticker};

    struct RecordingPort {
        accepted: Mutex<Vec<QueueEntry>>,
        fail_with: Option<&'static str>,
    }

    impl SubmissionPort for RecordingPort {
        fn submit(&self, entry: &QueueEntry) -> Result<(), SubmissionError> {
            if let Some(msg) = self.fail_with {
                return Err(SubmissionError(msg.to_string()));
            }
            self.accepted.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    fn port(fail_with: Option<&'static str>) -> RecordingPort {
        RecordingPort {
            accepted: Mutex::new(Vec::new()),
            fail_with,
        }
    }

    fn arrival() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 9, 15, 0).unwrap()
    }

    fn session() -> TriageSession {
        TriageSession::new(SlaThresholds::default(), Arc::new(ManualClock::new(arrival())))
    }

    fn vitals(systolic: i32, spo2: i32) -> VitalSignsInput {
        VitalSignsInput {
            blood_pressure_systolic: Some(systolic),
            blood_pressure_diastolic: Some(70),
            heart_rate: Some(80),
            respiratory_rate: Some(16),
            oxygen_saturation: Some(spo2),
            temperature: Some(36.8),
            glasgow_coma_scale: Some(15),
            pain_score: Some(0),
        }
    }

    fn tick_n(s: &mut TriageSession, n: u32) {
        for _ in 0..n {
            s.on_tick();
        }
    }

    #[test]
    fn begin_starts_timer() {
        let mut s = session();
        s.begin().unwrap();
        assert_eq!(s.timer().phase(), TimerPhase::Running);
        assert!(matches!(s.begin(), Err(SessionError::Timer(_))));
    }

    #[test]
    fn update_reclassifies_each_change() {
        let mut s = session();
        s.begin().unwrap();
        assert_eq!(s.update_vitals(vitals(120, 98)).unwrap().level, TriageLevel::Stable);
        assert_eq!(s.update_vitals(vitals(120, 93)).unwrap().level, TriageLevel::Urgent);
        assert_eq!(s.update_vitals(vitals(80, 93)).unwrap().level, TriageLevel::Critical);
    }

    #[test]
    fn incomplete_draft_clears_result() {
        let mut s = session();
        s.update_vitals(vitals(120, 98)).unwrap();
        let mut partial = vitals(120, 98);
        partial.heart_rate = None;
        let err = s.update_vitals(partial).unwrap_err();
        assert_eq!(
            err,
            SessionError::Validation(ValidationError::MissingVital(VitalKind::HeartRate))
        );
        assert!(s.result().is_none());
    }

    #[test]
    fn submit_without_result_is_refused() {
        let mut s = session();
        let err = s.submit("MRN-1", "A", "emergency", &port(None)).unwrap_err();
        assert_eq!(err, SessionError::NotClassified);
    }

    #[test]
    fn submit_creates_waiting_entry_and_resets() {
        let mut s = session();
        s.begin().unwrap();
        s.update_vitals(vitals(80, 98)).unwrap();
        tick_n(&mut s, 30);

        let p = port(None);
        let entry = s.submit("MRN-1", "A", "emergency", &p).unwrap();
        assert_eq!(entry.status, QueueStatus::Waiting);
        assert_eq!(entry.arrived_at, arrival());
        assert_eq!(entry.result.level, TriageLevel::Critical);
        assert_eq!(p.accepted.lock().unwrap().len(), 1);

        assert!(s.result().is_none());
        assert_eq!(s.timer().phase(), TimerPhase::Idle);
        assert_eq!(s.timer().elapsed_seconds(), 0);
    }

    #[test]
    fn submission_failure_keeps_state() {
        let mut s = session();
        s.begin().unwrap();
        s.update_vitals(vitals(80, 98)).unwrap();
        tick_n(&mut s, 95);

        let err = s
            .submit("MRN-1", "A", "emergency", &port(Some("board offline")))
            .unwrap_err();
        assert_eq!(err, SessionError::Submission("board offline".into()));
        assert_eq!(err.to_string(), "Submission failed: board offline");

        assert_eq!(s.result().unwrap().level, TriageLevel::Critical);
        assert_eq!(s.timer().elapsed_seconds(), 95);
        assert_eq!(s.timer().phase(), TimerPhase::Warning);
        assert_eq!(s.draft().blood_pressure_systolic, Some(80));
    }

    #[test]
    fn retriage_keeps_history() {
        let mut s = session();
        s.update_vitals(vitals(120, 93)).unwrap();
        let p = port(None);
        let mut entry = s.submit("MRN-1", "A", "emergency", &p).unwrap();

        s.begin().unwrap();
        s.update_vitals(vitals(80, 93)).unwrap();
        s.retriage(&mut entry, &p).unwrap();

        assert_eq!(entry.result.level, TriageLevel::Critical);
        assert_eq!(entry.history.len(), 1);
        assert_eq!(entry.history[0].level, TriageLevel::Urgent);
        assert_eq!(s.timer().phase(), TimerPhase::Idle);
    }

    #[test]
    fn failed_retriage_leaves_entry_unchanged() {
        let mut s = session();
        s.update_vitals(vitals(120, 93)).unwrap();
        let mut entry = s.submit("MRN-1", "A", "emergency", &port(None)).unwrap();
        let before = entry.clone();

        s.update_vitals(vitals(80, 93)).unwrap();
        let err = s.retriage(&mut entry, &port(Some("timeout"))).unwrap_err();
        assert_eq!(err, SessionError::Submission("timeout".into()));
        assert_eq!(entry, before);
        assert!(s.result().is_some());
    }

    #[test]
    fn retriage_of_closed_entry_is_refused() {
        let mut s = session();
        s.update_vitals(vitals(120, 93)).unwrap();
        let mut entry = s.submit("MRN-1", "A", "emergency", &port(None)).unwrap();
        entry.advance(QueueStatus::InProgress).unwrap();
        entry.advance(QueueStatus::Discharged).unwrap();

        s.update_vitals(vitals(80, 93)).unwrap();
        let err = s.retriage(&mut entry, &port(None)).unwrap_err();
        assert_eq!(
            err,
            SessionError::Queue(QueueError::RetriageClosed(QueueStatus::Discharged))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_drives_session_timer() {
        let mut s = session();
        s.begin().unwrap();
        let shared = Arc::new(Mutex::new(s));
        let handle = spawn_ticker(shared.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        drop(handle);
        assert_eq!(shared.lock().unwrap().timer().elapsed_seconds(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn configured_session_ticks_at_configured_period() {
        let config = TriageConfig {
            sla_warning_secs: 3,
            sla_critical_secs: 6,
            tick_period_ms: 250,
            ..TriageConfig::default()
        };
        let mut s = TriageSession::from_config(&config, Arc::new(ManualClock::new(arrival()))).unwrap();
        assert_eq!(s.timer().thresholds(), SlaThresholds::new(3, 6).unwrap());
        s.begin().unwrap();
        let shared = Arc::new(Mutex::new(s));
        let _handle = spawn_configured_ticker(shared.clone(), &config);
        tokio::time::sleep(Duration::from_millis(1100)).await;
        let s = shared.lock().unwrap();
        assert_eq!(s.timer().elapsed_seconds(), 4);
        assert_eq!(s.timer().phase(), TimerPhase::Warning);
    }

    #[test]
    fn invalid_config_thresholds_are_refused() {
        let config = TriageConfig {
            sla_warning_secs: 120,
            sla_critical_secs: 90,
            ..TriageConfig::default()
        };
        let err = TriageSession::from_config(&config, Arc::new(ManualClock::new(arrival())))
            .err()
            .unwrap();
        assert!(matches!(err, SessionError::Timer(TimerError::InvalidThresholds { .. })));
    }
}
