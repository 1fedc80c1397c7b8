//! # FocusFlow Core Library
//!
//! Core logic for the FocusFlow focus/break interval timer. Every operation is
//! reachable from the `focusflow` CLI; this crate holds the state machine, the
//! session log and the statistics computed over it.
//!
//! ## Architecture
//!
//! - **Interval Engine**: a wall-clock-deadline state machine cycling through
//!   work, short-break and long-break intervals. The caller drives it with
//!   `tick()`, or hands it to [`TimerService`] which runs a cancellable ticker.
//! - **Storage**: settings, the append-only session log and the engine record
//!   live in a SQLite key/value table; application config is TOML.
//! - **Stats**: pure, order-independent projections over the session log,
//!   scoped to local calendar days.
//! - **Insight**: best-effort daily tip from a generative-text service.
//!
//! ## Key Components
//!
//! - [`IntervalEngine`]: interval state machine
//! - [`TimerService`]: async countdown driver
//! - [`Database`]: persistence gateway
//! - [`Config`]: application configuration
//! - [`InsightClient`]: daily insight service

pub mod error;
pub mod events;
pub mod insight;
pub mod notify;
pub mod session;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, InsightError, StorageError, ValidationError};
pub use events::Event;
pub use insight::{InsightClient, EMPTY_INSIGHT, FALLBACK_INSIGHT};
pub use notify::{Notifier, SilentNotifier, TerminalBell};
pub use session::Session;
pub use settings::Settings;
pub use stats::{DailyProgress, DayMinutes, TodaySummary, Totals};
pub use storage::{Config, Database, Store};
pub use timer::{
    Clock, EngineState, IntervalEngine, Mode, RunState, SystemClock, TimerService, TimerSnapshot,
};
