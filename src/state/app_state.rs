//! Shared application state: the single timer behind an explicit interface

use std::{
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{Settings, TickOutcome, TimerMode, TimerState};
use crate::{services::Notifier, storage::StateStore};

/// Source of wall-clock time in milliseconds since the epoch
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Reads the system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// A mutation of the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tick,
    Toggle,
    Reset,
    SwitchMode(TimerMode),
    UpdateSettings(Settings),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Toggle => "toggle",
            Self::Reset => "reset",
            Self::SwitchMode(_) => "switch-mode",
            Self::UpdateSettings(_) => "update-settings",
        }
    }
}

/// Owns the timer. All reads go through [`AppState::snapshot`] and all
/// mutations through [`AppState::dispatch`]; each mutation is persisted and
/// broadcast to watchers.
pub struct AppState {
    timer_state: Mutex<TimerState>,
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    /// Channel for timer updates
    timer_update_tx: watch::Sender<TimerState>,
    /// Keep the receiver alive to prevent channel closure
    _timer_update_rx: watch::Receiver<TimerState>,
    /// Daemon metadata
    pub start_time: Instant,
    /// Last user action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl AppState {
    pub fn new(
        initial: TimerState,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (timer_update_tx, timer_update_rx) = watch::channel(initial.clone());

        Self {
            timer_state: Mutex::new(initial),
            store,
            notifier,
            clock,
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
            start_time: Instant::now(),
            last_action: Mutex::new(None),
        }
    }

    /// Get current timer state
    pub fn snapshot(&self) -> Result<TimerState, String> {
        self.timer_state
            .lock()
            .map(|state| state.clone())
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Subscribe to timer state changes
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.timer_update_tx.subscribe()
    }

    /// Current wall-clock time as seen by the timer
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Apply a command, persist the result and notify watchers.
    ///
    /// A tick that changes nothing is neither persisted nor broadcast.
    pub fn dispatch(&self, command: Command) -> Result<TimerState, String> {
        let now = self.clock.now_millis();

        let mut state = self
            .timer_state
            .lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?;

        let outcome = match command {
            Command::Tick => state.tick(now),
            Command::Toggle => {
                state.toggle_running(now);
                TickOutcome::Counted
            }
            Command::Reset => {
                state.reset_current_interval(now);
                TickOutcome::Counted
            }
            Command::SwitchMode(mode) => {
                state.switch_mode(mode, now);
                TickOutcome::Counted
            }
            Command::UpdateSettings(settings) => {
                state.update_settings(settings, now);
                TickOutcome::Counted
            }
        };

        if outcome == TickOutcome::Idle {
            return Ok(state.clone());
        }

        let new_state = state.clone();

        if command != Command::Tick {
            info!(
                "{}: mode={}, time_left={}s, running={}",
                command.name(),
                new_state.mode.as_str(),
                new_state.time_left,
                new_state.is_running
            );
            if let Ok(mut last_action) = self.last_action.lock() {
                *last_action = Some((command.name().to_string(), Utc::now()));
            }
        } else {
            debug!("tick: time_left={}s", new_state.time_left);
        }

        // Persist and broadcast under the lock so a later mutation can never
        // be overwritten by an earlier one
        if let Err(e) = self.store.save(&new_state) {
            warn!("Failed to persist timer state: {:#}", e);
        }

        // Notify timer state watchers
        if let Err(e) = self.timer_update_tx.send(new_state.clone()) {
            warn!("Failed to send timer update: {}", e);
        }

        drop(state);

        if let TickOutcome::Completed { finished, next } = outcome {
            info!(
                "Interval complete: {} -> {} (pomodoros: {})",
                finished.as_str(),
                next.as_str(),
                new_state.pomodoro_count
            );
            self.notifier.notify(finished, next);
        }

        Ok(new_state)
    }

    /// Calculate daemon uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|a| a.clone()) {
            Some((action, at)) => (Some(action), Some(at)),
            None => (None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::notifier::RecordingNotifier, storage::MemoryStore};

    const T: i64 = 1_700_000_000_000;

    fn fixture() -> (AppState, Arc<MemoryStore>, Arc<RecordingNotifier>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let clock = Arc::new(ManualClock::new(T));
        let state = AppState::new(
            TimerState::new(T),
            store.clone(),
            notifier.clone(),
            clock.clone(),
        );
        (state, store, notifier, clock)
    }

    #[test]
    fn every_mutation_is_persisted() {
        let (state, store, _, _) = fixture();
        state.dispatch(Command::Toggle).unwrap();
        state.dispatch(Command::Reset).unwrap();
        state.dispatch(Command::SwitchMode(TimerMode::LongBreak)).unwrap();
        state
            .dispatch(Command::UpdateSettings(Settings::new(30, 5, 20)))
            .unwrap();
        assert_eq!(store.writes(), 4);
        assert_eq!(store.load().unwrap(), Some(state.snapshot().unwrap()));
    }

    #[test]
    fn paused_tick_writes_nothing() {
        let (state, store, _, clock) = fixture();
        clock.advance(5_000);
        state.dispatch(Command::Tick).unwrap();
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn mutation_is_stamped_with_clock_time() {
        let (state, _, _, clock) = fixture();
        clock.set(T + 1234);
        let after = state.dispatch(Command::Toggle).unwrap();
        assert_eq!(after.last_update, T + 1234);
    }

    #[test]
    fn completion_notifies_once() {
        let (state, _, notifier, clock) = fixture();
        state
            .dispatch(Command::UpdateSettings(Settings::new(1, 5, 15)))
            .unwrap();
        state.dispatch(Command::Toggle).unwrap();

        clock.advance(61_000);
        let after = state.dispatch(Command::Tick).unwrap();
        assert_eq!(after.mode, TimerMode::ShortBreak);
        assert!(!after.is_running);

        clock.advance(1_000);
        state.dispatch(Command::Tick).unwrap();
        assert_eq!(
            notifier.events(),
            vec![(TimerMode::Work, TimerMode::ShortBreak)]
        );
    }

    #[test]
    fn watchers_see_new_state() {
        let (state, _, _, _) = fixture();
        let mut rx = state.subscribe();
        state.dispatch(Command::Toggle).unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_running);
    }

    #[test]
    fn last_action_is_recorded_for_user_commands() {
        let (state, _, _, _) = fixture();
        assert_eq!(state.get_last_action().0, None);
        state.dispatch(Command::Reset).unwrap();
        assert_eq!(state.get_last_action().0.as_deref(), Some("reset"));
    }

    /// Stalls on its first save so a second dispatch can race it
    #[derive(Default)]
    struct StallingStore {
        saves: Mutex<Vec<TimerState>>,
    }

    impl StateStore for StallingStore {
        fn load(&self) -> anyhow::Result<Option<TimerState>> {
            Ok(self.saves.lock().unwrap().last().cloned())
        }

        fn save(&self, state: &TimerState) -> anyhow::Result<()> {
            let first = self.saves.lock().unwrap().is_empty();
            if first {
                std::thread::sleep(std::time::Duration::from_millis(300));
            }
            self.saves.lock().unwrap().push(state.clone());
            Ok(())
        }
    }

    #[test]
    fn concurrent_dispatches_persist_and_broadcast_in_order() {
        let store = Arc::new(StallingStore::default());
        let state = Arc::new(AppState::new(
            TimerState::new(T),
            store.clone(),
            Arc::new(RecordingNotifier::default()),
            Arc::new(ManualClock::new(T)),
        ));
        let rx = state.subscribe();

        let racer = {
            let state = Arc::clone(&state);
            std::thread::spawn(move || state.dispatch(Command::Toggle).unwrap())
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        state.dispatch(Command::Toggle).unwrap();
        racer.join().unwrap();

        let live = state.snapshot().unwrap();
        assert!(!live.is_running);
        assert_eq!(store.load().unwrap(), Some(live.clone()));
        assert_eq!(*rx.borrow(), live);

        let saves = store.saves.lock().unwrap();
        assert_eq!(saves.len(), 2);
        assert!(saves[0].is_running);
    }
}
