//! State management module
//!
//! This module contains the pomodoro timer state machine, the settings form
//! contract and the shared state handle that owns the single timer instance.

pub mod app_state;
pub mod settings;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, Clock, Command, ManualClock, SystemClock};
pub use settings::SettingsForm;
pub use timer_state::{Settings, TickOutcome, TimerMode, TimerState};
