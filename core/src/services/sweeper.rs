//! Cancellable periodic background task shared by the registry sweep, the
//! session sweep and ledger maintenance.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

struct RunningTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// A named timer loop with an explicit start/stop lifecycle.
///
/// The first tick fires one full period after `start`. `stop` signals the
/// loop and waits for it to exit, so no timer outlives the owner's shutdown.
pub struct PeriodicTask {
    name: &'static str,
    running: Mutex<Option<RunningTask>>,
}

impl PeriodicTask {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            running: Mutex::new(None),
        }
    }

    /// Spawn the loop, calling `tick` every `period`
    ///
    /// Must be called from within a tokio runtime. Returns `false` without
    /// spawning if the task is already running or `period` is zero.
    pub fn start<F, Fut>(&self, period: Duration, mut tick: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if period.is_zero() {
            warn!(task = self.name, "Refusing to start background task with a zero interval");
            return false;
        }

        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.is_some() {
            debug!(task = self.name, "Background task already running");
            return false;
        }

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let name = self.name;

        let handle = tokio::spawn(async move {
            info!(task = name, interval_secs = period.as_secs(), "Background task started");

            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => tick().await,
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!(task = name, "Background task stopped");
        });

        *running = Some(RunningTask { shutdown, handle });
        true
    }

    /// Signal the loop to exit and wait for it. No-op when not running.
    pub async fn stop(&self) {
        let task = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(task) = task {
            let _ = task.shutdown.send(true);
            if let Err(e) = task.handle.await {
                warn!(task = self.name, error = %e, "Background task ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
