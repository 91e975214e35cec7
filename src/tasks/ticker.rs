//! Ticker background task
//!
//! Drives `Command::Tick` roughly once per second, but only while the timer is
//! running. The interval is created when the timer starts and dropped as soon
//! as it pauses, so no stale ticks pile up across pause/resume cycles.

use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::state::{AppState, Command};

/// Nominal tick cadence
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Background task that ticks the timer while it is running
pub async fn ticker_task(state: Arc<AppState>) {
    info!("Starting ticker task");

    let mut updates = state.subscribe();

    loop {
        // Wait for the timer to start
        let running = updates.borrow_and_update().is_running;
        if !running {
            if updates.changed().await.is_err() {
                break;
            }
            continue;
        }

        debug!("Timer running, starting tick interval");
        let mut ticks = interval(TICK_PERIOD);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticks.tick().await;

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    if let Err(e) = state.dispatch(Command::Tick) {
                        error!("Failed to tick timer: {}", e);
                    }
                }

                changed = updates.changed() => {
                    if changed.is_err() {
                        info!("Timer channel closed, stopping ticker");
                        return;
                    }
                    let running = updates.borrow_and_update().is_running;
                    if !running {
                        debug!("Timer paused, dropping tick interval");
                        break;
                    }
                }
            }
        }
    }

    info!("Ticker task finished");
}

/// Owned handle to the running ticker task. The task is aborted when the
/// handle is shut down or dropped.
#[derive(Debug)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn the ticker on the current runtime
    pub fn spawn(state: Arc<AppState>) -> Self {
        Self {
            handle: Some(tokio::spawn(ticker_task(state))),
        }
    }

    /// Stop the ticker and wait for it to wind down
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    error!("Ticker task failed: {}", e);
                }
            }
            info!("Ticker stopped");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
