//! Tomato Clock - A persistent pomodoro timer daemon
//!
//! This library provides the pomodoro state machine, its persistence, the
//! once-per-second ticker that drives it, and an HTTP surface for clients
//! that render the clock.

pub mod api;
pub mod clock_face;
pub mod config;
pub mod services;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::{AppState, Command, TimerMode, TimerState};
pub use utils::signals::shutdown_signal;
