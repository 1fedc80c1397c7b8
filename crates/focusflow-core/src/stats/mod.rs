//! Session aggregation.
//!
//! Read-only projections of the session log: today's sessions, progress
//! toward the daily target, the rolling focus histogram and all-time totals.

mod daily;

pub use daily::{
    daily_minutes_histogram, daily_progress, today_summary, todays_work_sessions, totals,
    DailyProgress, DayMinutes, TodaySummary, Totals, DEFAULT_HISTOGRAM_DAYS,
};
