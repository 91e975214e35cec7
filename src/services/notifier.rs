//! Interval completion notifications

use std::{
    io::Write,
    sync::{Arc, Mutex},
};
use tokio::{process::Command, runtime::Handle};
use tracing::{debug, info, warn};

use crate::state::TimerMode;

/// Fire-and-forget signal that an interval has run out.
///
/// Implementations must not block and must swallow their own failures.
pub trait Notifier: Send + Sync {
    fn notify(&self, finished: TimerMode, next: TimerMode);
}

/// Rings the terminal bell on stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct BellNotifier;

impl Notifier for BellNotifier {
    fn notify(&self, finished: TimerMode, next: TimerMode) {
        debug!("Ringing bell for {} -> {}", finished.as_str(), next.as_str());
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
            warn!("Failed to ring terminal bell: {}", e);
        }
    }
}

/// Runs a shell command on completion, e.g. a sound player or desktop
/// notification tool. The finished and next modes are exported as
/// `TOMATO_FINISHED` and `TOMATO_NEXT`.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    command: String,
}

impl CommandNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, finished: TimerMode, next: TimerMode) {
        let Ok(handle) = Handle::try_current() else {
            warn!("No async runtime available, skipping notify command");
            return;
        };

        let command = self.command.clone();
        handle.spawn(async move {
            debug!("Running notify command: {}", command);

            let result = Command::new("sh")
                .arg("-c")
                .arg(&command)
                .env("TOMATO_FINISHED", finished.as_str())
                .env("TOMATO_NEXT", next.as_str())
                .output()
                .await;

            match result {
                Ok(output) if output.status.success() => {
                    info!("Notify command finished");
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("Notify command failed ({}): {}", output.status, stderr.trim());
                }
                Err(e) => warn!("Failed to execute notify command: {}", e),
            }
        });
    }
}

/// Does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _finished: TimerMode, _next: TimerMode) {}
}

/// Remembers every notification it receives
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<(TimerMode, TimerMode)>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<(TimerMode, TimerMode)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, finished: TimerMode, next: TimerMode) {
        if let Ok(mut events) = self.events.lock() {
            events.push((finished, next));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_notifier_without_runtime_is_harmless() {
        CommandNotifier::new("exit 1").notify(TimerMode::Work, TimerMode::ShortBreak);
    }

    #[tokio::test]
    async fn command_notifier_exports_modes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let notifier = CommandNotifier::new(format!(
            "echo \"$TOMATO_FINISHED $TOMATO_NEXT\" > {}",
            out.display()
        ));
        notifier.notify(TimerMode::Work, TimerMode::LongBreak);

        for _ in 0..50 {
            if let Ok(text) = std::fs::read_to_string(&out) {
                if !text.is_empty() {
                    assert_eq!(text.trim(), "work longBreak");
                    return;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("notify command never ran");
    }

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::default();
        notifier.notify(TimerMode::Work, TimerMode::ShortBreak);
        notifier.notify(TimerMode::ShortBreak, TimerMode::Work);
        assert_eq!(
            notifier.events(),
            vec![
                (TimerMode::Work, TimerMode::ShortBreak),
                (TimerMode::ShortBreak, TimerMode::Work)
            ]
        );
    }
}
