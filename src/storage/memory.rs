//! In-memory state store

use std::sync::Mutex;

use super::StateStore;
use crate::state::TimerState;

/// Keeps the serialized state in memory. Used for `--ephemeral` runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far
    pub fn writes(&self) -> usize {
        self.writes.lock().map(|w| *w).unwrap_or(0)
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> anyhow::Result<Option<TimerState>> {
        let blob = self
            .blob
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock memory store: {}", e))?;
        match blob.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &TimerState) -> anyhow::Result<()> {
        let json = serde_json::to_string(state)?;
        *self
            .blob
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock memory store: {}", e))? = Some(json);
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }
}
