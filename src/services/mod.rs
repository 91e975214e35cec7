//! External side-channel module
//!
//! This module contains the notification hooks fired when an interval ends.

pub mod notifier;

// Re-export main types
pub use notifier::{BellNotifier, CommandNotifier, Notifier, RecordingNotifier, SilentNotifier};
