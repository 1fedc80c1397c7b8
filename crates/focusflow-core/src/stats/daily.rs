//! Day-scoped and rolling projections over the session log.
//!
//! Everything here is a pure function of `(log, now)`: no caching, same
//! input gives the same output, and the order of log entries never matters.
//! "Day" always means a local calendar day in the time zone of `now`,
//! from one local midnight to the next.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Window used by the activity report.
pub const DEFAULT_HISTOGRAM_DAYS: u32 = 7;

/// Today's completed work, as handed to the insight service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodaySummary {
    pub count: u32,
    /// Whole minutes, rounded down.
    pub total_minutes: u64,
}

/// Today's count measured against the user's daily target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub count: u32,
    pub target: u32,
    pub focused_minutes: u64,
    pub target_reached: bool,
}

/// One bar of the focus-time histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMinutes {
    pub date: NaiveDate,
    /// Short weekday name, e.g. "Mon".
    pub weekday: String,
    pub minutes: u64,
}

/// All-time totals over completed work sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub sessions: u64,
    /// Whole minutes, rounded down.
    pub minutes: u64,
}

/// Completed work sessions recorded on the local day containing `now`,
/// ordered by timestamp.
pub fn todays_work_sessions<'a, Tz: TimeZone>(
    log: &'a [Session],
    now: &DateTime<Tz>,
) -> Vec<&'a Session> {
    let (start, end) = day_bounds(&now.timezone(), now.date_naive());
    let mut today: Vec<&Session> = log
        .iter()
        .filter(|s| s.is_completed_work() && (start..end).contains(&s.timestamp))
        .collect();
    today.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
    today
}

pub fn today_summary<Tz: TimeZone>(log: &[Session], now: &DateTime<Tz>) -> TodaySummary {
    let today = todays_work_sessions(log, now);
    let seconds = sum_seconds(today.iter().copied());
    TodaySummary {
        count: u32::try_from(today.len()).unwrap_or(u32::MAX),
        total_minutes: seconds / 60,
    }
}

pub fn daily_progress<Tz: TimeZone>(
    log: &[Session],
    now: &DateTime<Tz>,
    target: u32,
) -> DailyProgress {
    let summary = today_summary(log, now);
    DailyProgress {
        count: summary.count,
        target,
        focused_minutes: summary.total_minutes,
        target_reached: target > 0 && summary.count >= target,
    }
}

/// Focus minutes for each of the last `days` local days, oldest first and
/// ending with today. Each day's seconds are summed, then rounded to the
/// nearest minute.
pub fn daily_minutes_histogram<Tz: TimeZone>(
    log: &[Session],
    now: &DateTime<Tz>,
    days: u32,
) -> Vec<DayMinutes> {
    let tz = now.timezone();
    let today = now.date_naive();

    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .map(|date| {
            let (start, end) = day_bounds(&tz, date);
            let seconds = sum_seconds(
                log.iter()
                    .filter(|s| s.is_completed_work() && (start..end).contains(&s.timestamp)),
            );
            DayMinutes {
                date,
                weekday: date.format("%a").to_string(),
                minutes: (seconds as f64 / 60.0).round() as u64,
            }
        })
        .collect()
}

pub fn totals(log: &[Session]) -> Totals {
    let (sessions, seconds) = log
        .iter()
        .filter(|s| s.is_completed_work())
        .fold((0u64, 0u64), |(n, secs), s| {
            (n + 1, secs.saturating_add(s.duration_seconds))
        });
    Totals {
        sessions,
        minutes: seconds / 60,
    }
}

/// Total seconds, saturating instead of overflowing on absurd records.
fn sum_seconds<'a>(sessions: impl Iterator<Item = &'a Session>) -> u64 {
    sessions.fold(0u64, |acc, s| acc.saturating_add(s.duration_seconds))
}

/// Epoch-millisecond range `[start, end)` of a local calendar day.
fn day_bounds<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> (i64, i64) {
    let start = start_of_day(tz, date);
    let end = date
        .succ_opt()
        .map(|next| start_of_day(tz, next))
        .unwrap_or(i64::MAX);
    (start, end)
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        // Midnight skipped by a DST jump: the day starts an hour later.
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| midnight.and_utc().timestamp_millis())
}
