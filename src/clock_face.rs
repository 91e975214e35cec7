//! Clock face formatting and digit-change detection
//!
//! The renderer animates only the digit cells whose character changed between
//! two readings. Minutes are not padded, so the minute field can change width
//! (9:59 -> 10:00); digits are therefore matched by role and by position
//! counted from the least-significant end.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::state::{TimerMode, TimerState};

/// One digit cell of the clock face. The index counts from the rightmost
/// digit of its field, so `Second(0)` is the ones digit of the seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "field", content = "index", rename_all = "camelCase")]
pub enum DigitSlot {
    Minute(usize),
    Second(usize),
}

/// The two digit fields of a `m:ss` reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockDigits {
    pub minutes: String,
    pub seconds: String,
}

impl ClockDigits {
    pub fn from_seconds(total: u32) -> Self {
        Self {
            minutes: (total / 60).to_string(),
            seconds: format!("{:02}", total % 60),
        }
    }
}

/// Format remaining seconds as `m:ss`
pub fn format_time(total: u32) -> String {
    let digits = ClockDigits::from_seconds(total);
    format!("{}:{}", digits.minutes, digits.seconds)
}

/// Digit cells that differ between two readings
pub fn changed_digits(old: u32, new: u32) -> BTreeSet<DigitSlot> {
    let old = ClockDigits::from_seconds(old);
    let new = ClockDigits::from_seconds(new);

    let mut changed = BTreeSet::new();
    for index in diff_from_right(&old.minutes, &new.minutes) {
        changed.insert(DigitSlot::Minute(index));
    }
    for index in diff_from_right(&old.seconds, &new.seconds) {
        changed.insert(DigitSlot::Second(index));
    }
    changed
}

/// Positions (from the right) where two digit strings disagree. A digit
/// present on only one side counts as changed.
fn diff_from_right(old: &str, new: &str) -> Vec<usize> {
    let old: Vec<u8> = old.bytes().rev().collect();
    let new: Vec<u8> = new.bytes().rev().collect();
    (0..old.len().max(new.len()))
        .filter(|&i| old.get(i) != new.get(i))
        .collect()
}

/// Display name of a mode
pub fn mode_label(mode: TimerMode) -> &'static str {
    match mode {
        TimerMode::Work => "Work",
        TimerMode::ShortBreak => "Short Break",
        TimerMode::LongBreak => "Long Break",
    }
}

/// Everything a renderer needs to draw the clock face
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockView {
    pub display: String,
    pub digits: ClockDigits,
    pub mode: TimerMode,
    pub mode_label: String,
    pub is_running: bool,
    pub pomodoro_count: u32,
    pub progress_percent: f64,
    /// Cells to animate, relative to the caller's previous reading
    pub changed: Vec<DigitSlot>,
}

impl ClockView {
    pub fn new(state: &TimerState, previous: Option<u32>) -> Self {
        let changed = previous
            .map(|prev| changed_digits(prev, state.time_left).into_iter().collect())
            .unwrap_or_default();

        Self {
            display: format_time(state.time_left),
            digits: ClockDigits::from_seconds(state.time_left),
            mode: state.mode,
            mode_label: mode_label(state.mode).to_string(),
            is_running: state.is_running,
            pomodoro_count: state.pomodoro_count,
            progress_percent: state.progress_percent(),
            changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(items: &[DigitSlot]) -> BTreeSet<DigitSlot> {
        items.iter().copied().collect()
    }

    #[test]
    fn formats_unpadded_minutes() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(9), "0:09");
        assert_eq!(format_time(125), "2:05");
        assert_eq!(format_time(1500), "25:00");
        assert_eq!(format_time(6000), "100:00");
    }

    #[test]
    fn only_minute_digit_changes() {
        assert_eq!(changed_digits(125, 65), slots(&[DigitSlot::Minute(0)]));
    }

    #[test]
    fn crossing_a_minute_boundary() {
        // "0:09" -> "1:00": the tens of seconds is '0' on both sides
        assert_eq!(
            changed_digits(9, 60),
            slots(&[DigitSlot::Minute(0), DigitSlot::Second(0)])
        );
        assert_eq!(
            changed_digits(60, 59),
            slots(&[DigitSlot::Minute(0), DigitSlot::Second(0), DigitSlot::Second(1)])
        );
    }

    #[test]
    fn minute_width_change_aligns_from_the_right() {
        // "10:00" -> "9:59"
        assert_eq!(
            changed_digits(600, 599),
            slots(&[
                DigitSlot::Minute(0),
                DigitSlot::Minute(1),
                DigitSlot::Second(0),
                DigitSlot::Second(1),
            ])
        );
        // "19:00" -> "9:00": ones digit of the minutes is unchanged
        assert_eq!(changed_digits(1140, 540), slots(&[DigitSlot::Minute(1)]));
    }

    #[test]
    fn identical_readings_change_nothing() {
        assert!(changed_digits(1500, 1500).is_empty());
    }

    #[test]
    fn view_reports_changes_against_previous() {
        let mut state = TimerState::new(0);
        state.time_left = 1499;
        let view = ClockView::new(&state, Some(1500));
        assert_eq!(view.display, "24:59");
        assert_eq!(view.mode_label, "Work");
        assert_eq!(
            view.changed,
            vec![DigitSlot::Minute(0), DigitSlot::Second(0), DigitSlot::Second(1)]
        );
        assert!(ClockView::new(&state, None).changed.is_empty());
    }
}
