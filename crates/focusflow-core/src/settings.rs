//! User-editable timer settings.
//!
//! Stored as one JSON record under the `settings` key of the persistence
//! gateway. Field names follow the stored camelCase schema; the older
//! `*Duration` / `targetSessions` spellings are accepted on read.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::storage::json_path;
use crate::timer::Mode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_work_minutes", alias = "workDuration")]
    pub work_minutes: u32,
    #[serde(default = "default_short_break_minutes", alias = "shortBreakDuration")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes", alias = "longBreakDuration")]
    pub long_break_minutes: u32,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_work: bool,
    #[serde(default = "default_target_sessions", alias = "targetSessions")]
    pub target_sessions_per_day: u32,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

fn default_work_minutes() -> u32 {
    25
}
fn default_short_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}
fn default_target_sessions() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            auto_start_breaks: false,
            auto_start_work: false,
            target_sessions_per_day: default_target_sessions(),
            sound_enabled: true,
        }
    }
}

impl Settings {
    pub fn minutes_for(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Work => self.work_minutes,
            Mode::ShortBreak => self.short_break_minutes,
            Mode::LongBreak => self.long_break_minutes,
        }
    }

    /// Configured length of an interval in seconds.
    pub fn duration_secs(&self, mode: Mode) -> u64 {
        u64::from(self.minutes_for(mode)).saturating_mul(60)
    }

    /// Check the positivity invariants.
    ///
    /// The engine never calls this; it is the editor's job before saving.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let checks = [
            ("workMinutes", self.work_minutes),
            ("shortBreakMinutes", self.short_break_minutes),
            ("longBreakMinutes", self.long_break_minutes),
            ("targetSessionsPerDay", self.target_sessions_per_day),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(ValidationError::NotPositive {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Get a field by its stored name (e.g. `workMinutes`).
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let json = serde_json::to_value(self).ok()?;
        json_path::get(&json, key).cloned()
    }

    /// Update one field in memory and validate the result.
    ///
    /// Nothing is persisted; hand the result to the gateway's `save_settings`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        json_path::set(&mut json, key, value)?;
        let updated: Settings = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}
