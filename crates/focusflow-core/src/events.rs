use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::timer::{Mode, RunState};

/// Every engine transition produces an Event.
/// The CLI prints them; the countdown service broadcasts completions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        mode: Mode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    IntervalCompleted {
        completed_mode: Mode,
        next_mode: Mode,
        /// The recorded session, for work intervals.
        session: Option<Session>,
        /// Work sessions committed today, including this one.
        sessions_today: u32,
        auto_started: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        run_state: RunState,
        seconds_remaining: u64,
        total_seconds: u64,
        progress_pct: f64,
        display: String,
        at: DateTime<Utc>,
    },
}
