//! Configuration and CLI argument handling

use std::{path::PathBuf, sync::Arc};

use clap::Parser;

use crate::{
    services::{BellNotifier, CommandNotifier, Notifier, SilentNotifier},
    storage::{default_state_path, JsonFileStore, MemoryStore, StateStore},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "tomato-clock")]
#[command(about = "A persistent pomodoro timer daemon")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "25025")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// File the timer state is persisted to
    #[arg(long, value_name = "PATH")]
    pub state_file: Option<PathBuf>,

    /// Keep state in memory only
    #[arg(long, conflicts_with = "state_file")]
    pub ephemeral: bool,

    /// Shell command to run when an interval ends
    #[arg(long, value_name = "CMD")]
    pub notify_command: Option<String>,

    /// Do not ring the terminal bell when an interval ends
    #[arg(long, conflicts_with = "notify_command")]
    pub silent: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Where the state file lives, unless running ephemeral
    pub fn state_path(&self) -> Option<PathBuf> {
        if self.ephemeral {
            return None;
        }
        self.state_file.clone().or_else(default_state_path)
    }

    /// Build the configured state store
    pub fn store(&self) -> Arc<dyn StateStore> {
        match self.state_path() {
            Some(path) => Arc::new(JsonFileStore::new(path)),
            None => Arc::new(MemoryStore::new()),
        }
    }

    /// Build the configured completion notifier
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        match (&self.notify_command, self.silent) {
            (Some(command), _) => Arc::new(CommandNotifier::new(command.clone())),
            (None, true) => Arc::new(SilentNotifier),
            (None, false) => Arc::new(BellNotifier),
        }
    }
}
