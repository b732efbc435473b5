//! Periodic wake-up driver for the SLA timer and the activation countdown.
//!
//! Spawns a tokio task that calls [`Tick::on_tick`] once per period on a
//! shared target. The first (immediate) interval tick is skipped, so the
//! first call happens one full period after spawning. The task is aborted
//! when the handle is stopped or dropped, so an unmounted screen never
//! leaves a callback behind.
//!
//! Observer callbacks raised during a tick are handed back as [`Deferred`]
//! work and run after the target's lock is released, so an observer may
//! lock the shared target again (e.g. to read a timer snapshot).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::TriageConfig;

/// Work a target asks the ticker to run outside its lock.
pub type Deferred = Box<dyn FnOnce() + Send>;

/// Whether the ticker should keep running after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// A state machine advanced by wall-clock seconds.
pub trait Tick: Send + 'static {
    fn on_tick(&mut self) -> TickControl;

    /// Notifications queued by the last `on_tick`, run once the lock is released.
    fn take_deferred(&mut self) -> Option<Deferred> {
        None
    }
}

/// Handle for a running ticker task.
///
/// Stops the task on `stop()` or automatically on `Drop`.
pub struct TickerHandle {
    handle: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// Cancel the ticker. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Ticker stopped");
        }
    }

    /// True once the task has ended, either by `TickControl::Stop` or by `stop()`.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start ticking `target` every `period`. Must be called within a tokio runtime.
pub fn spawn_ticker<T: Tick>(target: Arc<Mutex<T>>, period: Duration) -> TickerHandle {
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // First tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let (control, deferred) = match target.lock() {
                Ok(mut guard) => {
                    let control = guard.on_tick();
                    (control, guard.take_deferred())
                }
                Err(_) => {
                    tracing::error!("Ticker target lock poisoned, stopping ticker");
                    (TickControl::Stop, None)
                }
            };
            if let Some(work) = deferred {
                work();
            }
            if control == TickControl::Stop {
                tracing::debug!("Ticker target requested stop");
                break;
            }
        }
    });

    TickerHandle {
        handle: Some(handle),
    }
}

/// Start ticking `target` at the configured period.
pub fn spawn_configured_ticker<T: Tick>(target: Arc<Mutex<T>>, config: &TriageConfig) -> TickerHandle {
    spawn_ticker(target, config.tick_period())
}
