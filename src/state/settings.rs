//! Settings form input and its save-time validation

use serde::{Deserialize, Serialize};

use super::timer_state::{
    Settings, DEFAULT_LONG_BREAK_MINUTES, DEFAULT_SHORT_BREAK_MINUTES, DEFAULT_WORK_MINUTES,
};

/// Upper bound for the work interval, in minutes
pub const MAX_WORK_MINUTES: u32 = 60;
/// Upper bound for the short break, in minutes
pub const MAX_SHORT_BREAK_MINUTES: u32 = 30;
/// Upper bound for the long break, in minutes
pub const MAX_LONG_BREAK_MINUTES: u32 = 60;

/// Raw settings as submitted by a client. Any field may be missing or zero
/// while the user is still typing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsForm {
    pub work_time: Option<u32>,
    #[serde(alias = "shortBreakTime")]
    pub short_break: Option<u32>,
    #[serde(alias = "longBreakTime")]
    pub long_break: Option<u32>,
}

impl SettingsForm {
    /// Resolve the form into durations at save time: empty or zero fields
    /// fall back to their defaults, oversized ones are cut to the bound.
    pub fn sanitize(&self) -> Settings {
        Settings::new(
            field(self.work_time, DEFAULT_WORK_MINUTES, MAX_WORK_MINUTES),
            field(self.short_break, DEFAULT_SHORT_BREAK_MINUTES, MAX_SHORT_BREAK_MINUTES),
            field(self.long_break, DEFAULT_LONG_BREAK_MINUTES, MAX_LONG_BREAK_MINUTES),
        )
    }
}

fn field(value: Option<u32>, default: u32, max: u32) -> u32 {
    match value {
        None | Some(0) => default,
        Some(minutes) => minutes.min(max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_form_yields_defaults() {
        assert_eq!(SettingsForm::default().sanitize(), Settings::new(25, 5, 15));
    }

    #[test]
    fn zero_fields_fall_back_individually() {
        let form = SettingsForm {
            work_time: Some(40),
            short_break: Some(0),
            long_break: None,
        };
        assert_eq!(form.sanitize(), Settings::new(40, 5, 15));
    }

    #[test]
    fn values_are_capped_at_form_bounds() {
        let form = SettingsForm {
            work_time: Some(90),
            short_break: Some(31),
            long_break: Some(61),
        };
        assert_eq!(form.sanitize(), Settings::new(60, 30, 60));
    }

    #[test]
    fn parses_partial_json() {
        let form: SettingsForm = serde_json::from_str(r#"{"workTime":30}"#).unwrap();
        assert_eq!(form.sanitize(), Settings::new(30, 5, 15));
    }
}
