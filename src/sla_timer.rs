//! Triage SLA timer.
//!
//! Measures how long the triage interaction itself is taking and raises a
//! one-shot notification at the warning and critical thresholds. Purely
//! observational: it never blocks submission and never touches
//! classification.
//!
//! ```text
//! idle --start--> running --tick--> running
//! running --reach(warning)--> warning --reach(critical)--> critical
//! running/warning/critical --pause--> paused --resume--> (phase before pause)
//! any --reset--> idle (elapsed = 0, thresholds re-armed)
//! ```

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{TriageConfig, DEFAULT_SLA_CRITICAL_SECS, DEFAULT_SLA_WARNING_SECS};
use crate::ticker::{Deferred, Tick, TickControl};

type SharedObserver = Arc<Mutex<Box<dyn ThresholdObserver>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Warning,
    Critical,
}

impl TimerPhase {
    /// Phases in which ticks advance elapsed time.
    pub fn is_counting(self) -> bool {
        matches!(
            self,
            TimerPhase::Running | TimerPhase::Warning | TimerPhase::Critical
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKind {
    Warning,
    Critical,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("Warning threshold ({warning}s) must be positive and below critical ({critical}s)")]
    InvalidThresholds { warning: u32, critical: u32 },

    #[error("Cannot {action} the SLA timer while {phase:?}")]
    InvalidTransition {
        phase: TimerPhase,
        action: &'static str,
    },
}

/// Receives threshold crossings (banner + audible alert in the UI).
///
/// When the timer is driven by the ticker, crossings are delivered after
/// the timer's lock is released, so the observer may lock the shared timer
/// to read its state.
pub trait ThresholdObserver: Send {
    fn on_threshold(&mut self, kind: ThresholdKind, elapsed_seconds: u32);
}

impl<F> ThresholdObserver for F
where
    F: FnMut(ThresholdKind, u32) + Send,
{
    fn on_threshold(&mut self, kind: ThresholdKind, elapsed_seconds: u32) {
        self(kind, elapsed_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaThresholds {
    pub warning_secs: u32,
    pub critical_secs: u32,
}

impl SlaThresholds {
    pub fn new(warning_secs: u32, critical_secs: u32) -> Result<Self, TimerError> {
        if warning_secs == 0 || warning_secs >= critical_secs {
            return Err(TimerError::InvalidThresholds {
                warning: warning_secs,
                critical: critical_secs,
            });
        }
        Ok(Self {
            warning_secs,
            critical_secs,
        })
    }

    pub fn from_config(config: &TriageConfig) -> Result<Self, TimerError> {
        Self::new(config.sla_warning_secs, config.sla_critical_secs)
    }
}

impl Default for SlaThresholds {
    fn default() -> Self {
        Self {
            warning_secs: DEFAULT_SLA_WARNING_SECS,
            critical_secs: DEFAULT_SLA_CRITICAL_SECS,
        }
    }
}

/// Serializable snapshot for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub elapsed_seconds: u32,
    pub phase: TimerPhase,
    pub warning_threshold: u32,
    pub critical_threshold: u32,
}

pub struct TriageSlaTimer {
    id: Uuid,
    thresholds: SlaThresholds,
    elapsed_seconds: u32,
    phase: TimerPhase,
    /// Phase to restore on resume.
    paused_from: Option<TimerPhase>,
    warning_fired: bool,
    critical_fired: bool,
    observer: Option<SharedObserver>,
    /// Crossings not yet delivered to the observer.
    pending: Vec<(ThresholdKind, u32)>,
}

impl TriageSlaTimer {
    pub fn new(thresholds: SlaThresholds) -> Self {
        Self {
            id: Uuid::new_v4(),
            thresholds,
            elapsed_seconds: 0,
            phase: TimerPhase::Idle,
            paused_from: None,
            warning_fired: false,
            critical_fired: false,
            observer: None,
            pending: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: impl ThresholdObserver + 'static) -> Self {
        self.observer = Some(Arc::new(Mutex::new(Box::new(observer))));
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn thresholds(&self) -> SlaThresholds {
        self.thresholds
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            elapsed_seconds: self.elapsed_seconds,
            phase: self.phase,
            warning_threshold: self.thresholds.warning_secs,
            critical_threshold: self.thresholds.critical_secs,
        }
    }

    /// Seconds left before `kind` fires; zero once it has been reached.
    pub fn remaining(&self, kind: ThresholdKind) -> u32 {
        let target = match kind {
            ThresholdKind::Warning => self.thresholds.warning_secs,
            ThresholdKind::Critical => self.thresholds.critical_secs,
        };
        target.saturating_sub(self.elapsed_seconds)
    }

    pub fn start(&mut self) -> Result<(), TimerError> {
        if self.phase != TimerPhase::Idle {
            return Err(self.invalid("start"));
        }
        self.phase = TimerPhase::Running;
        tracing::debug!(timer_id = %self.id, "Triage SLA timer started");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        if !self.phase.is_counting() {
            return Err(self.invalid("pause"));
        }
        self.paused_from = Some(self.phase);
        self.phase = TimerPhase::Paused;
        tracing::debug!(timer_id = %self.id, elapsed = self.elapsed_seconds, "Triage SLA timer paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TimerError> {
        if self.phase != TimerPhase::Paused {
            return Err(self.invalid("resume"));
        }
        self.phase = self.paused_from.take().unwrap_or(TimerPhase::Running);
        tracing::debug!(timer_id = %self.id, elapsed = self.elapsed_seconds, "Triage SLA timer resumed");
        Ok(())
    }

    /// Back to idle at zero with both thresholds re-armed. Valid from any phase.
    pub fn reset(&mut self) {
        self.elapsed_seconds = 0;
        self.phase = TimerPhase::Idle;
        self.paused_from = None;
        self.warning_fired = false;
        self.critical_fired = false;
        self.pending.clear();
        tracing::debug!(timer_id = %self.id, "Triage SLA timer reset");
    }

    /// Advance one second and notify the observer of any crossing.
    /// No-op unless running, warning or critical.
    pub fn tick(&mut self) -> TimerPhase {
        let phase = self.advance();
        if let Some(work) = self.take_deferred() {
            work();
        }
        phase
    }

    /// Advance one second, queueing crossings for later delivery.
    fn advance(&mut self) -> TimerPhase {
        if !self.phase.is_counting() {
            return self.phase;
        }
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);

        if !self.warning_fired && self.elapsed_seconds >= self.thresholds.warning_secs {
            self.warning_fired = true;
            self.phase = TimerPhase::Warning;
            tracing::warn!(
                timer_id = %self.id,
                elapsed = self.elapsed_seconds,
                "Triage SLA warning threshold reached"
            );
            self.notify(ThresholdKind::Warning);
        }
        if !self.critical_fired && self.elapsed_seconds >= self.thresholds.critical_secs {
            self.critical_fired = true;
            self.phase = TimerPhase::Critical;
            tracing::warn!(
                timer_id = %self.id,
                elapsed = self.elapsed_seconds,
                "Triage SLA critical threshold reached"
            );
            self.notify(ThresholdKind::Critical);
        }
        self.phase
    }

    fn notify(&mut self, kind: ThresholdKind) {
        if self.observer.is_some() {
            self.pending.push((kind, self.elapsed_seconds));
        }
    }

    fn invalid(&self, action: &'static str) -> TimerError {
        TimerError::InvalidTransition {
            phase: self.phase,
            action,
        }
    }
}

impl Tick for TriageSlaTimer {
    fn on_tick(&mut self) -> TickControl {
        self.advance();
        TickControl::Continue
    }

    fn take_deferred(&mut self) -> Option<Deferred> {
        if self.pending.is_empty() {
            return None;
        }
        let observer = self.observer.clone()?;
        let crossings = std::mem::take(&mut self.pending);
        let timer_id = self.id;
        Some(Box::new(move || match observer.lock() {
            Ok(mut observer) => {
                for (kind, elapsed) in crossings {
                    observer.on_threshold(kind, elapsed);
                }
            }
            Err(_) => {
                tracing::error!(%timer_id, "Threshold observer lock poisoned, alert dropped");
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::ticker::spawn_ticker;

    type Alerts = Arc<Mutex<Vec<(ThresholdKind, u32)>>>;

    fn recording_timer() -> (TriageSlaTimer, Alerts) {
        let alerts: Alerts = Arc::new(Mutex::new(Vec::new()));
        let sink = alerts.clone();
        let timer = TriageSlaTimer::new(SlaThresholds::default()).with_observer(
            move |kind: ThresholdKind, elapsed: u32| {
                sink.lock().unwrap().push((kind, elapsed));
            },
        );
        (timer, alerts)
    }

    fn tick_n(timer: &mut TriageSlaTimer, n: u32) {
        for _ in 0..n {
            timer.tick();
        }
    }

    #[test]
    fn new_timer_is_idle_at_zero() {
        let (timer, _) = recording_timer();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.elapsed_seconds(), 0);
        assert_eq!(timer.remaining(ThresholdKind::Warning), 90);
    }

    #[test]
    fn idle_ticks_do_not_count() {
        let (mut timer, _) = recording_timer();
        tick_n(&mut timer, 10);
        assert_eq!(timer.elapsed_seconds(), 0);
    }

    #[test]
    fn warning_fires_once_at_ninety() {
        let (mut timer, alerts) = recording_timer();
        timer.start().unwrap();
        tick_n(&mut timer, 89);
        assert_eq!(timer.phase(), TimerPhase::Running);
        assert!(alerts.lock().unwrap().is_empty());

        timer.tick();
        assert_eq!(timer.phase(), TimerPhase::Warning);
        tick_n(&mut timer, 10);
        assert_eq!(*alerts.lock().unwrap(), vec![(ThresholdKind::Warning, 90)]);
    }

    #[test]
    fn critical_fires_once_at_one_twenty() {
        let (mut timer, alerts) = recording_timer();
        timer.start().unwrap();
        tick_n(&mut timer, 120);
        assert_eq!(timer.phase(), TimerPhase::Critical);
        tick_n(&mut timer, 60);
        assert_eq!(timer.phase(), TimerPhase::Critical);
        assert_eq!(timer.elapsed_seconds(), 180);
        assert_eq!(
            *alerts.lock().unwrap(),
            vec![(ThresholdKind::Warning, 90), (ThresholdKind::Critical, 120)]
        );
    }

    #[test]
    fn reset_rearms_warning() {
        let (mut timer, alerts) = recording_timer();
        timer.start().unwrap();
        tick_n(&mut timer, 95);
        timer.reset();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.elapsed_seconds(), 0);

        timer.start().unwrap();
        tick_n(&mut timer, 90);
        let warnings = alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == ThresholdKind::Warning)
            .count();
        assert_eq!(warnings, 2);
    }

    #[test]
    fn pause_keeps_elapsed_and_resume_continues() {
        let (mut timer, _) = recording_timer();
        timer.start().unwrap();
        tick_n(&mut timer, 30);
        timer.pause().unwrap();
        tick_n(&mut timer, 50);
        assert_eq!(timer.elapsed_seconds(), 30);
        assert_eq!(timer.phase(), TimerPhase::Paused);

        timer.resume().unwrap();
        assert_eq!(timer.phase(), TimerPhase::Running);
        timer.tick();
        assert_eq!(timer.elapsed_seconds(), 31);
    }

    #[test]
    fn resume_after_warning_does_not_refire() {
        let (mut timer, alerts) = recording_timer();
        timer.start().unwrap();
        tick_n(&mut timer, 100);
        timer.pause().unwrap();
        timer.resume().unwrap();
        assert_eq!(timer.phase(), TimerPhase::Warning);
        timer.tick();
        assert_eq!(alerts.lock().unwrap().len(), 1);
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let (mut timer, _) = recording_timer();
        assert!(matches!(
            timer.pause(),
            Err(TimerError::InvalidTransition { phase: TimerPhase::Idle, action: "pause" })
        ));
        assert!(timer.resume().is_err());
        timer.start().unwrap();
        assert!(timer.start().is_err());
        assert_eq!(timer.phase(), TimerPhase::Running);
    }

    #[test]
    fn thresholds_are_validated() {
        assert!(SlaThresholds::new(0, 10).is_err());
        assert!(SlaThresholds::new(10, 10).is_err());
        assert_eq!(
            SlaThresholds::new(30, 60).unwrap(),
            SlaThresholds { warning_secs: 30, critical_secs: 60 }
        );
        assert_eq!(
            SlaThresholds::from_config(&TriageConfig::default()).unwrap(),
            SlaThresholds::default()
        );
    }

    #[test]
    fn state_snapshot_serializes_camel_case() {
        let (mut timer, _) = recording_timer();
        timer.start().unwrap();
        timer.tick();
        let json = serde_json::to_value(timer.state()).unwrap();
        assert_eq!(json["elapsedSeconds"], 1);
        assert_eq!(json["phase"], "running");
        assert_eq!(json["warningThreshold"], 90);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_drives_timer_each_second() {
        let (mut timer, _) = recording_timer();
        timer.start().unwrap();
        let shared = Arc::new(Mutex::new(timer));
        let handle = spawn_ticker(shared.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(5500)).await;
        drop(handle);
        assert_eq!(shared.lock().unwrap().elapsed_seconds(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn observer_can_read_shared_timer_during_alert() {
        let seen: Arc<Mutex<Vec<TimerState>>> = Arc::new(Mutex::new(Vec::new()));
        let slot: Arc<Mutex<Option<Arc<Mutex<TriageSlaTimer>>>>> = Arc::new(Mutex::new(None));

        let sink = seen.clone();
        let lookup = slot.clone();
        let mut timer = TriageSlaTimer::new(SlaThresholds::new(2, 4).unwrap()).with_observer(
            move |_kind: ThresholdKind, _elapsed: u32| {
                let shared = lookup.lock().unwrap().clone().unwrap();
                let state = shared.lock().unwrap().state();
                sink.lock().unwrap().push(state);
            },
        );
        timer.start().unwrap();
        let shared = Arc::new(Mutex::new(timer));
        *slot.lock().unwrap() = Some(shared.clone());

        let _handle = spawn_ticker(shared.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(4500)).await;

        let phases: Vec<TimerPhase> = seen.lock().unwrap().iter().map(|s| s.phase).collect();
        assert_eq!(phases, vec![TimerPhase::Warning, TimerPhase::Critical]);
        slot.lock().unwrap().take();
    }
}
