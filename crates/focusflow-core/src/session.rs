use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::Mode;

/// One entry of the append-only session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    #[serde(alias = "duration")]
    pub duration_seconds: u64,
    pub mode: Mode,
    pub completed: bool,
}

impl Session {
    /// A finished interval recorded at `at`.
    pub fn completed(mode: Mode, duration_seconds: u64, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: at.timestamp_millis(),
            duration_seconds,
            mode,
            completed: true,
        }
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// Completed work intervals are the only entries statistics count.
    pub fn is_completed_work(&self) -> bool {
        self.completed && self.mode == Mode::Work
    }
}
