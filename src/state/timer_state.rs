//! Timer state structure and the pomodoro state machine

use serde::{Deserialize, Serialize};

/// Default work interval in minutes
pub const DEFAULT_WORK_MINUTES: u32 = 25;
/// Default short break in minutes
pub const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;
/// Default long break in minutes
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;
/// Every Nth completed pomodoro is followed by a long break
pub const POMODOROS_PER_LONG_BREAK: u32 = 4;

/// Which kind of interval is currently counting down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    /// Parse the wire name used in URLs and persisted state
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "work" => Some(Self::Work),
            "shortBreak" | "short-break" => Some(Self::ShortBreak),
            "longBreak" | "long-break" => Some(Self::LongBreak),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::ShortBreak => "shortBreak",
            Self::LongBreak => "longBreak",
        }
    }
}

/// Configured interval durations, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub work_time: u32,
    pub short_break: u32,
    pub long_break: u32,
}

impl Settings {
    pub fn new(work_time: u32, short_break: u32, long_break: u32) -> Self {
        Self {
            work_time,
            short_break,
            long_break,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(
            DEFAULT_WORK_MINUTES,
            DEFAULT_SHORT_BREAK_MINUTES,
            DEFAULT_LONG_BREAK_MINUTES,
        )
    }
}

/// What a single tick did to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Paused, or less than a whole second has passed
    Idle,
    /// Remaining time was corrected by the elapsed wall-clock seconds
    Counted,
    /// The interval ran out and the timer moved on to the next mode
    Completed { finished: TimerMode, next: TimerMode },
}

/// The persisted pomodoro timer.
///
/// Every mutating method takes the wall-clock time of the mutation in
/// milliseconds since the epoch and stamps it into `last_update`; the next
/// tick measures elapsed time from that stamp, so a suspended tick source
/// never makes the countdown lag behind real time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Remaining seconds in the current interval
    pub time_left: u32,
    pub is_running: bool,
    pub mode: TimerMode,
    /// Completed work intervals, never reset
    pub pomodoro_count: u32,
    pub work_time: u32,
    #[serde(alias = "shortBreakTime")]
    pub short_break: u32,
    #[serde(alias = "longBreakTime")]
    pub long_break: u32,
    /// Wall-clock time of the last mutation (ms since epoch)
    pub last_update: i64,
}

impl TimerState {
    /// Fresh state: paused at the start of a default work interval
    pub fn new(now: i64) -> Self {
        let settings = Settings::default();
        Self {
            time_left: settings.work_time * 60,
            is_running: false,
            mode: TimerMode::Work,
            pomodoro_count: 0,
            work_time: settings.work_time,
            short_break: settings.short_break,
            long_break: settings.long_break,
            last_update: now,
        }
    }

    pub fn settings(&self) -> Settings {
        Settings::new(self.work_time, self.short_break, self.long_break)
    }

    /// Every configured duration is at least one minute
    pub fn has_valid_durations(&self) -> bool {
        self.work_time > 0 && self.short_break > 0 && self.long_break > 0
    }

    /// Configured length of `mode` in seconds
    pub fn duration_for(&self, mode: TimerMode) -> u32 {
        let minutes = match mode {
            TimerMode::Work => self.work_time,
            TimerMode::ShortBreak => self.short_break,
            TimerMode::LongBreak => self.long_break,
        };
        minutes.saturating_mul(60)
    }

    /// Share of the current interval already elapsed, 0..=100
    pub fn progress_percent(&self) -> f64 {
        let total = self.duration_for(self.mode);
        if total == 0 {
            return 100.0;
        }
        let done = f64::from(total.saturating_sub(self.time_left));
        (done / f64::from(total) * 100.0).clamp(0.0, 100.0)
    }

    /// Advance the countdown by the whole seconds elapsed since `last_update`.
    ///
    /// Sub-second remainders are kept: if less than a second has passed the
    /// state is left untouched so the fraction is counted by the next tick.
    pub fn tick(&mut self, now: i64) -> TickOutcome {
        if !self.is_running {
            return TickOutcome::Idle;
        }

        let elapsed = (now - self.last_update).max(0) / 1000;
        if elapsed == 0 && self.time_left > 0 {
            return TickOutcome::Idle;
        }

        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
        self.time_left = self.time_left.saturating_sub(elapsed);
        self.last_update = now;

        if self.time_left == 0 {
            let (finished, next) = self.complete_interval(now);
            TickOutcome::Completed { finished, next }
        } else {
            TickOutcome::Counted
        }
    }

    /// Flip between running and paused; nothing else changes
    pub fn toggle_running(&mut self, now: i64) {
        self.is_running = !self.is_running;
        self.last_update = now;
    }

    /// Pause and rewind the current interval to its full configured length
    pub fn reset_current_interval(&mut self, now: i64) {
        self.is_running = false;
        self.time_left = self.duration_for(self.mode);
        self.last_update = now;
    }

    /// Pause and jump to the start of `mode`
    pub fn switch_mode(&mut self, mode: TimerMode, now: i64) {
        self.is_running = false;
        self.mode = mode;
        self.time_left = self.duration_for(mode);
        self.last_update = now;
    }

    /// Store new durations. A paused timer picks them up immediately;
    /// a running one keeps counting down its current interval.
    pub fn update_settings(&mut self, settings: Settings, now: i64) {
        self.work_time = settings.work_time;
        self.short_break = settings.short_break;
        self.long_break = settings.long_break;
        if !self.is_running {
            self.time_left = self.duration_for(self.mode);
        }
        self.last_update = now;
    }

    /// Finish the current interval and pause at the start of the next one.
    /// Returns the finished mode and the mode that follows it.
    fn complete_interval(&mut self, now: i64) -> (TimerMode, TimerMode) {
        let finished = self.mode;
        let next = match finished {
            TimerMode::Work => {
                self.pomodoro_count += 1;
                if self.pomodoro_count % POMODOROS_PER_LONG_BREAK == 0 {
                    TimerMode::LongBreak
                } else {
                    TimerMode::ShortBreak
                }
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Work,
        };

        self.is_running = false;
        self.mode = next;
        self.time_left = self.duration_for(next);
        self.last_update = now;
        (finished, next)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(chrono::Utc::now().timestamp_millis())
    }
}
