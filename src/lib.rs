pub mod clock;
pub mod config;
pub mod emergency; // Code activation guard + audit trail
pub mod models;
pub mod queue; // Board ordering + statistics
pub mod sla_timer; // Triage duration thresholds
pub mod ticker;
pub mod triage; // Classifier + in-progress session

mod log_audit;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TriageConfig;
pub use emergency::{
    ActivationAuditEntry, ActivationError, CodeBroadcaster, EmergencyActivation, GuardViolation,
    TransitionObserver,
};
pub use models::{QueueEntry, TriageLevel, TriageResult, ValidationError, VitalSignsInput};
pub use queue::{order, waiting_list, QueueStatistics};
pub use sla_timer::{SlaThresholds, ThresholdKind, ThresholdObserver, TimerPhase, TriageSlaTimer};
pub use ticker::{spawn_configured_ticker, spawn_ticker, Deferred, Tick, TickControl, TickerHandle};
pub use triage::{classify, SubmissionPort, TriageSession};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` wins over the built-in
/// filter. Returns false if a subscriber was already installed by the host.
pub fn init_tracing() -> bool {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} v{} logging initialised", config::APP_NAME, config::APP_VERSION);
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_safe_to_call_twice() {
        init_tracing();
        assert!(!init_tracing());
    }
}
