//! Persistence module
//!
//! The timer is stored as a single JSON object under a fixed key. It is read
//! once at startup and overwritten after every mutation.

pub mod json_file;
pub mod memory;

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::{info, warn};

use crate::state::TimerState;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Logical key the timer state is stored under
pub const STATE_KEY: &str = "pomodoro-timer";

/// Get/set access to the persisted timer blob
pub trait StateStore: Send + Sync {
    /// Read the stored state. `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> anyhow::Result<Option<TimerState>>;

    /// Overwrite the stored state
    fn save(&self, state: &TimerState) -> anyhow::Result<()>;
}

/// Load the persisted state, substituting a fresh one if it is absent or
/// cannot be read.
pub fn load_or_default(store: &dyn StateStore, now: i64) -> TimerState {
    match store.load() {
        Ok(Some(state)) if !state.has_valid_durations() => {
            warn!(
                "Discarding stored timer with zero duration: work={}m, short={}m, long={}m",
                state.work_time, state.short_break, state.long_break
            );
            TimerState::new(now)
        }
        Ok(Some(state)) => {
            info!(
                "Restored timer: mode={}, time_left={}s, running={}, pomodoros={}",
                state.mode.as_str(),
                state.time_left,
                state.is_running,
                state.pomodoro_count
            );
            state
        }
        Ok(None) => {
            info!("No stored timer found, starting fresh");
            TimerState::new(now)
        }
        Err(e) => {
            warn!("Discarding unreadable timer state: {:#}", e);
            TimerState::new(now)
        }
    }
}

/// Default location of the state file
pub fn default_state_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "tomato-clock")
        .map(|dirs| dirs.data_local_dir().join(format!("{}.json", STATE_KEY)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TimerMode;

    struct BrokenStore;

    impl StateStore for BrokenStore {
        fn load(&self) -> anyhow::Result<Option<TimerState>> {
            anyhow::bail!("disk on fire")
        }

        fn save(&self, _state: &TimerState) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unreadable_store_falls_back_to_default() {
        let state = load_or_default(&BrokenStore, 42);
        assert_eq!(state, TimerState::new(42));
    }

    #[test]
    fn empty_store_falls_back_to_default() {
        let state = load_or_default(&MemoryStore::new(), 7);
        assert_eq!(state.mode, TimerMode::Work);
        assert_eq!(state.time_left, 1500);
        assert_eq!(state.last_update, 7);
    }

    #[test]
    fn stored_state_is_restored() {
        let store = MemoryStore::new();
        let mut saved = TimerState::new(0);
        saved.switch_mode(TimerMode::LongBreak, 10);
        store.save(&saved).unwrap();
        assert_eq!(load_or_default(&store, 99), saved);
    }

    #[test]
    fn zero_durations_fall_back_to_default() {
        for (work, short, long) in [(0, 5, 15), (25, 0, 15), (25, 5, 0)] {
            let store = MemoryStore::new();
            let mut saved = TimerState::new(0);
            saved.work_time = work;
            saved.short_break = short;
            saved.long_break = long;
            saved.pomodoro_count = 3;
            store.save(&saved).unwrap();

            let loaded = load_or_default(&store, 5);
            assert_eq!(loaded, TimerState::new(5));
        }
    }
}
