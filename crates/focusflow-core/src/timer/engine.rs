//! Interval engine implementation.
//!
//! The engine is a wall-clock-deadline state machine. It does not own a
//! thread: the caller passes `now` into every command and calls `tick()`
//! periodically (see [`super::TimerService`] for the async driver).
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --start--> Running
//! Running --(deadline reached)--> Idle   (next mode selected)
//! any --switch_mode / reset--> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = IntervalEngine::new(settings, store, notifier);
//! engine.start(Utc::now());
//! // In a loop:
//! engine.tick(Utc::now()); // Returns Some(Event::IntervalCompleted) when the interval ends
//! ```

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::mode::{Mode, RunState};
use crate::events::Event;
use crate::notify::Notifier;
use crate::session::Session;
use crate::settings::Settings;
use crate::stats::todays_work_sessions;
use crate::storage::Store;

/// Every fourth work session of the day is followed by a long break.
pub const LONG_BREAK_EVERY: u32 = 4;

/// The engine's own state, detached from its collaborators so it can be
/// persisted between processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pub mode: Mode,
    pub run_state: RunState,
    pub seconds_remaining: u64,
    /// Wall-clock deadline in epoch milliseconds. Only set while running.
    #[serde(default)]
    pub deadline_ms: Option<i64>,
}

impl EngineState {
    pub fn idle(mode: Mode, settings: &Settings) -> Self {
        Self {
            mode,
            run_state: RunState::Idle,
            seconds_remaining: settings.duration_secs(mode),
            deadline_ms: None,
        }
    }
}

/// What a display shows: mode, run state and whole seconds left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub mode: Mode,
    pub run_state: RunState,
    pub seconds_remaining: u64,
}

/// Core interval engine.
///
/// Owns the countdown state and talks to the persistence gateway and the
/// notification sink when an interval completes.
pub struct IntervalEngine {
    settings: Settings,
    state: EngineState,
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
}

impl IntervalEngine {
    /// Create an engine idle in `Work` mode.
    pub fn new(settings: Settings, store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self {
        let state = EngineState::idle(Mode::Work, &settings);
        Self {
            settings,
            state,
            store,
            notifier,
        }
    }

    /// Rebuild an engine from persisted state.
    ///
    /// Inconsistent combinations are repaired: a running state without a
    /// deadline becomes paused, and an idle engine is resized from `settings`.
    pub fn restore(
        mut state: EngineState,
        settings: Settings,
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        match (state.run_state, state.deadline_ms) {
            (RunState::Running, None) => state.run_state = RunState::Paused,
            (RunState::Running, Some(_)) => {}
            (RunState::Idle, _) => {
                state.seconds_remaining = settings.duration_secs(state.mode);
                state.deadline_ms = None;
            }
            (RunState::Paused, _) => state.deadline_ms = None,
        }
        Self {
            settings,
            state,
            store,
            notifier,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn run_state(&self) -> RunState {
        self.state.run_state
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.state.seconds_remaining
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.state
            .deadline_ms
            .and_then(DateTime::from_timestamp_millis)
    }

    /// Configured length of the current mode.
    pub fn total_secs(&self) -> u64 {
        self.settings.duration_secs(self.state.mode)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.state.mode,
            run_state: self.state.run_state,
            seconds_remaining: self.state.seconds_remaining,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot_event(&self, at: DateTime<Utc>) -> Event {
        let total = self.total_secs();
        let remaining = self.state.seconds_remaining;
        let progress_pct = if total == 0 {
            0.0
        } else {
            (total.saturating_sub(remaining) as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
        };
        Event::StateSnapshot {
            mode: self.state.mode,
            run_state: self.state.run_state,
            seconds_remaining: remaining,
            total_seconds: total,
            progress_pct,
            display: format_clock(remaining),
            at,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Select a mode and go idle with its full duration. Always succeeds.
    pub fn switch_mode(&mut self, mode: Mode, now: DateTime<Utc>) -> Event {
        self.enter_idle(mode);
        debug!(%mode, "mode switched");
        Event::ModeSwitched {
            mode,
            seconds_remaining: self.state.seconds_remaining,
            at: now,
        }
    }

    /// Begin or resume the countdown. `None` when already running.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state.run_state {
            RunState::Idle | RunState::Paused => {
                let remaining_ms =
                    i64::try_from(self.state.seconds_remaining.saturating_mul(1000)).unwrap_or(i64::MAX);
                self.state.run_state = RunState::Running;
                self.state.deadline_ms = Some(now.timestamp_millis().saturating_add(remaining_ms));
                debug!(mode = %self.state.mode, secs = self.state.seconds_remaining, "timer started");
                Some(Event::TimerStarted {
                    mode: self.state.mode,
                    seconds_remaining: self.state.seconds_remaining,
                    at: now,
                })
            }
            RunState::Running => None,
        }
    }

    /// Freeze the countdown. `None` unless running.
    ///
    /// A pause that arrives at or after the deadline completes the interval
    /// instead, and the completion event is returned.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state.run_state != RunState::Running {
            return None;
        }
        let remaining = self.remaining_at(now);
        if remaining == 0 {
            return Some(self.complete(now));
        }
        self.state.run_state = RunState::Paused;
        self.state.seconds_remaining = remaining;
        self.state.deadline_ms = None;
        debug!(secs = remaining, "timer paused");
        Some(Event::TimerPaused {
            mode: self.state.mode,
            seconds_remaining: remaining,
            at: now,
        })
    }

    /// Go idle with the full duration of the current mode. Never records a session.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Event {
        let mode = self.state.mode;
        self.enter_idle(mode);
        debug!(%mode, "timer reset");
        Event::TimerReset {
            mode,
            seconds_remaining: self.state.seconds_remaining,
            at: now,
        }
    }

    /// Adopt new settings. Only an idle engine is resized; a started
    /// interval keeps its original target.
    pub fn on_settings_changed(&mut self, settings: Settings) {
        self.settings = settings;
        if self.state.run_state == RunState::Idle {
            self.state.seconds_remaining = self.settings.duration_secs(self.state.mode);
        }
    }

    /// Re-evaluate the countdown against the wall clock.
    ///
    /// Returns `Some(Event::IntervalCompleted)` when the deadline has passed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state.run_state != RunState::Running {
            return None;
        }
        let remaining = self.remaining_at(now);
        self.state.seconds_remaining = remaining;
        if remaining == 0 {
            return Some(self.complete(now));
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Whole seconds left, rounded up, never more than last computed.
    fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        let Some(deadline) = self.state.deadline_ms else {
            return self.state.seconds_remaining;
        };
        let gap_ms = deadline.saturating_sub(now.timestamp_millis());
        if gap_ms <= 0 {
            return 0;
        }
        let secs = (gap_ms as u64).div_ceil(1000);
        secs.min(self.state.seconds_remaining)
    }

    fn enter_idle(&mut self, mode: Mode) {
        self.state = EngineState::idle(mode, &self.settings);
    }

    /// Finish the current interval. Everything is dated at the deadline, not
    /// at `now`, so a late tick still attributes the session to the right day.
    fn complete(&mut self, now: DateTime<Utc>) -> Event {
        let completed_mode = self.state.mode;
        let completed_at = self.deadline().map_or(now, |deadline| deadline.min(now));
        self.state.deadline_ms = None;
        self.state.run_state = RunState::Idle;
        self.state.seconds_remaining = 0;

        let local_completed = completed_at.with_timezone(&Local);
        let (session, log) = if completed_mode == Mode::Work {
            let session = Session::completed(
                Mode::Work,
                self.settings.duration_secs(Mode::Work),
                completed_at,
            );
            let log = match self.store.append_session(&session) {
                Ok(log) => log,
                Err(e) => {
                    error!(error = %e, "failed to persist completed session");
                    let mut log = self.store.load_sessions();
                    log.push(session.clone());
                    log
                }
            };
            (Some(session), log)
        } else {
            (None, self.store.load_sessions())
        };
        let sessions_today =
            u32::try_from(todays_work_sessions(&log, &local_completed).len()).unwrap_or(u32::MAX);

        if self.settings.sound_enabled {
            if let Err(e) = self.notifier.notify(completed_mode) {
                warn!(error = %e, "completion notification failed");
            }
        }

        let (next_mode, auto_start) = match completed_mode {
            Mode::Work if sessions_today > 0 && sessions_today % LONG_BREAK_EVERY == 0 => {
                (Mode::LongBreak, self.settings.auto_start_breaks)
            }
            Mode::Work => (Mode::ShortBreak, self.settings.auto_start_breaks),
            Mode::ShortBreak | Mode::LongBreak => (Mode::Work, self.settings.auto_start_work),
        };

        self.enter_idle(next_mode);
        let auto_started = auto_start && self.start(completed_at).is_some();

        info!(
            completed = %completed_mode,
            next = %next_mode,
            sessions_today,
            auto_started,
            "interval completed"
        );

        Event::IntervalCompleted {
            completed_mode,
            next_mode,
            session,
            sessions_today,
            auto_started,
            at: completed_at,
        }
    }
}

/// `MM:SS`, with minutes allowed past 99.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingNotifier {
        calls: AtomicUsize,
    }

    impl Notifier for CountingNotifier {
        fn notify(&self, _: Mode) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct BrokenNotifier;

    impl Notifier for BrokenNotifier {
        fn notify(&self, _: Mode) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Err("speaker unplugged".into())
        }
    }

    /// 09:00 local time, far from midnight in every zone.
    fn morning() -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2024, 3, 12, 9, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn secs(n: i64) -> Duration {
        Duration::seconds(n)
    }

    fn engine_with(settings: Settings) -> (IntervalEngine, Arc<Database>, Arc<CountingNotifier>) {
        let db = Arc::new(Database::open_memory().unwrap());
        let notifier = Arc::new(CountingNotifier::default());
        let engine = IntervalEngine::new(settings, db.clone(), notifier.clone());
        (engine, db, notifier)
    }

    fn engine() -> (IntervalEngine, Arc<Database>, Arc<CountingNotifier>) {
        engine_with(Settings::default())
    }

    fn completions(events: &[Option<Event>]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, Some(Event::IntervalCompleted { .. })))
            .count()
    }

    #[test]
    fn starts_idle_in_work_mode() {
        let (engine, _, _) = engine();
        assert_eq!(
            engine.snapshot(),
            TimerSnapshot {
                mode: Mode::Work,
                run_state: RunState::Idle,
                seconds_remaining: 1500,
            }
        );
        assert!(engine.deadline().is_none());
    }

    #[test]
    fn full_duration_fires_exactly_one_completion() {
        for minutes in [1u32, 5, 25, 90] {
            let mut settings = Settings::default();
            settings.work_minutes = minutes;
            let (mut engine, _, _) = engine_with(settings);
            let d = i64::from(minutes) * 60;
            let t0 = morning();

            engine.start(t0).unwrap();
            let mut events = Vec::new();
            for s in (0..d).step_by(7) {
                events.push(engine.tick(t0 + secs(s)));
            }
            assert_eq!(completions(&events), 0, "fired early for {minutes}m");

            events.push(engine.tick(t0 + secs(d)));
            events.push(engine.tick(t0 + secs(d + 1)));
            events.push(engine.tick(t0 + secs(d + 3600)));
            assert_eq!(completions(&events), 1, "expected one completion for {minutes}m");
            assert_eq!(engine.run_state(), RunState::Idle);
        }
    }

    #[test]
    fn remaining_rounds_up_to_whole_seconds() {
        let (mut engine, _, _) = engine();
        let t0 = morning();
        engine.start(t0).unwrap();

        engine.tick(t0 + Duration::milliseconds(500));
        assert_eq!(engine.seconds_remaining(), 1500);
        engine.tick(t0 + secs(1));
        assert_eq!(engine.seconds_remaining(), 1499);
        engine.tick(t0 + Duration::milliseconds(1_499_001));
        assert_eq!(engine.seconds_remaining(), 1);
        engine.tick(t0 + Duration::milliseconds(1_499_999));
        assert_eq!(engine.seconds_remaining(), 1);
        assert_eq!(engine.run_state(), RunState::Running);

        assert!(engine.tick(t0 + secs(1500)).is_some());
    }

    #[test]
    fn remaining_never_increases_when_clock_steps_back() {
        let (mut engine, _, _) = engine();
        let t0 = morning();
        engine.start(t0).unwrap();
        engine.tick(t0 + secs(600));
        assert_eq!(engine.seconds_remaining(), 900);
        engine.tick(t0 - secs(600));
        assert_eq!(engine.seconds_remaining(), 900);
    }

    #[test]
    fn pause_then_start_keeps_remaining() {
        let (mut engine, _, _) = engine();
        let t0 = morning();
        engine.start(t0).unwrap();
        engine.tick(t0 + secs(100));

        let paused = engine.pause(t0 + Duration::milliseconds(100_400)).unwrap();
        assert!(matches!(
            paused,
            Event::TimerPaused { seconds_remaining: 1400, .. }
        ));
        assert_eq!(engine.run_state(), RunState::Paused);
        assert!(engine.deadline().is_none());

        // Wall-clock time spent paused must not leak into the countdown.
        let t1 = t0 + secs(5000);
        assert!(engine.tick(t1).is_none());
        assert_eq!(engine.seconds_remaining(), 1400);

        engine.start(t1).unwrap();
        engine.tick(t1 + Duration::milliseconds(300));
        assert_eq!(engine.seconds_remaining(), 1400);
        assert_eq!(engine.deadline(), Some(t1 + secs(1400)));
    }

    #[test]
    fn pause_after_deadline_completes_instead() {
        let (mut engine, db, _) = engine();
        let t0 = morning();
        engine.start(t0).unwrap();
        let event = engine.pause(t0 + secs(2000)).unwrap();
        assert!(matches!(event, Event::IntervalCompleted { .. }));
        assert_eq!(engine.run_state(), RunState::Idle);
        assert_eq!(db.load_sessions().len(), 1);
    }

    #[test]
    fn invalid_commands_are_ignored() {
        let (mut engine, _, _) = engine();
        let t0 = morning();
        assert!(engine.pause(t0).is_none());
        assert!(engine.tick(t0).is_none());
        engine.start(t0).unwrap();
        assert!(engine.start(t0 + secs(10)).is_none());
        assert_eq!(engine.deadline(), Some(t0 + secs(1500)));
    }

    #[test]
    fn work_completion_records_session_and_moves_to_short_break() {
        let (mut engine, db, notifier) = engine();
        let t0 = morning();
        engine.start(t0).unwrap();
        let event = engine.tick(t0 + secs(1500)).unwrap();

        let log = db.load_sessions();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].mode, Mode::Work);
        assert_eq!(log[0].duration_seconds, 1500);
        assert!(log[0].completed);
        assert_eq!(log[0].timestamp, (t0 + secs(1500)).timestamp_millis());

        match event {
            Event::IntervalCompleted {
                completed_mode,
                next_mode,
                session,
                sessions_today,
                auto_started,
                ..
            } => {
                assert_eq!(completed_mode, Mode::Work);
                assert_eq!(next_mode, Mode::ShortBreak);
                assert_eq!(session.as_ref(), Some(&log[0]));
                assert_eq!(sessions_today, 1);
                assert!(!auto_started);
            }
            other => panic!("Expected IntervalCompleted, got {other:?}"),
        }

        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.run_state(), RunState::Idle);
        assert_eq!(engine.seconds_remaining(), 300);
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fourth_work_session_earns_long_break() {
        let (mut engine, _, _) = engine();
        let mut t = morning();

        for n in 1..=4u32 {
            assert_eq!(engine.mode(), Mode::Work);
            engine.start(t).unwrap();
            t += secs(1500);
            let next = match engine.tick(t) {
                Some(Event::IntervalCompleted {
                    next_mode,
                    sessions_today,
                    ..
                }) => {
                    assert_eq!(sessions_today, n);
                    next_mode
                }
                other => panic!("Expected completion, got {other:?}"),
            };
            let expected = if n == 4 { Mode::LongBreak } else { Mode::ShortBreak };
            assert_eq!(next, expected, "after work session {n}");

            engine.start(t).unwrap();
            t += secs(engine.seconds_remaining() as i64);
            assert!(matches!(
                engine.tick(t),
                Some(Event::IntervalCompleted { next_mode: Mode::Work, session: None, .. })
            ));
        }
    }

    #[test]
    fn long_break_counts_sessions_already_in_the_log() {
        let (mut engine, db, _) = engine();
        let t0 = morning();
        for i in 0..3 {
            db.append_session(&Session::completed(Mode::Work, 1500, t0 - secs(3600 - i)))
                .unwrap();
        }
        engine.start(t0).unwrap();
        assert!(matches!(
            engine.tick(t0 + secs(1500)),
            Some(Event::IntervalCompleted { next_mode: Mode::LongBreak, sessions_today: 4, .. })
        ));
        assert_eq!(engine.seconds_remaining(), 900);
    }

    #[test]
    fn yesterdays_sessions_do_not_count() {
        let (mut engine, db, _) = engine();
        let t0 = morning();
        for _ in 0..3 {
            db.append_session(&Session::completed(Mode::Work, 1500, t0 - Duration::days(1)))
                .unwrap();
        }
        engine.start(t0).unwrap();
        assert!(matches!(
            engine.tick(t0 + secs(1500)),
            Some(Event::IntervalCompleted { next_mode: Mode::ShortBreak, sessions_today: 1, .. })
        ));
    }

    #[test]
    fn late_tick_dates_session_at_the_deadline() {
        let (mut engine, db, _) = engine();
        let evening = Local
            .with_ymd_and_hms(2024, 5, 14, 22, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        let next_morning = evening + Duration::hours(11);
        let deadline = evening + secs(1500);

        engine.start(evening).unwrap();
        match engine.tick(next_morning) {
            Some(Event::IntervalCompleted { session: Some(session), sessions_today, at, .. }) => {
                assert_eq!(session.timestamp, deadline.timestamp_millis());
                assert_eq!(sessions_today, 1);
                assert_eq!(at, deadline);
            }
            other => panic!("Expected work completion, got {other:?}"),
        }

        let log = db.load_sessions();
        let histogram =
            crate::stats::daily_minutes_histogram(&log, &next_morning.with_timezone(&Local), 2);
        assert_eq!(
            histogram.iter().map(|d| d.minutes).collect::<Vec<_>>(),
            vec![25, 0]
        );
    }

    #[test]
    fn late_tick_auto_starts_from_the_deadline() {
        let mut settings = Settings::default();
        settings.auto_start_breaks = true;
        let (mut engine, _, _) = engine_with(settings);
        let t0 = morning();
        engine.start(t0).unwrap();
        engine.tick(t0 + secs(1600)).unwrap();
        assert_eq!(engine.deadline(), Some(t0 + secs(1800)));
    }

    #[test]
    fn break_completion_returns_to_work_without_recording() {
        let (mut engine, db, _) = engine();
        let t0 = morning();
        engine.switch_mode(Mode::ShortBreak, t0);
        engine.start(t0).unwrap();
        let event = engine.tick(t0 + secs(300)).unwrap();
        assert!(matches!(
            event,
            Event::IntervalCompleted { completed_mode: Mode::ShortBreak, next_mode: Mode::Work, .. }
        ));
        assert!(db.load_sessions().is_empty());
        assert_eq!(engine.seconds_remaining(), 1500);
    }

    #[test]
    fn auto_start_breaks_runs_the_break() {
        let mut settings = Settings::default();
        settings.auto_start_breaks = true;
        let (mut engine, _, _) = engine_with(settings);
        let t0 = morning();
        engine.start(t0).unwrap();
        let done = t0 + secs(1500);
        assert!(matches!(
            engine.tick(done),
            Some(Event::IntervalCompleted { auto_started: true, .. })
        ));
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.run_state(), RunState::Running);
        assert_eq!(engine.deadline(), Some(done + secs(300)));

        // Work does not auto-start unless asked to.
        assert!(matches!(
            engine.tick(done + secs(300)),
            Some(Event::IntervalCompleted { next_mode: Mode::Work, auto_started: false, .. })
        ));
        assert_eq!(engine.run_state(), RunState::Idle);
    }

    #[test]
    fn auto_start_work_runs_after_break() {
        let mut settings = Settings::default();
        settings.auto_start_work = true;
        let (mut engine, _, _) = engine_with(settings);
        let t0 = morning();
        engine.switch_mode(Mode::LongBreak, t0);
        engine.start(t0).unwrap();
        engine.tick(t0 + secs(900)).unwrap();
        assert_eq!(engine.mode(), Mode::Work);
        assert_eq!(engine.run_state(), RunState::Running);
    }

    #[test]
    fn reset_restores_full_duration_from_any_state() {
        let (mut engine, db, _) = engine();
        let t0 = morning();

        engine.reset(t0);
        assert_eq!((engine.run_state(), engine.seconds_remaining()), (RunState::Idle, 1500));

        engine.start(t0).unwrap();
        engine.tick(t0 + secs(700));
        engine.reset(t0 + secs(700));
        assert_eq!((engine.run_state(), engine.seconds_remaining()), (RunState::Idle, 1500));
        assert!(engine.deadline().is_none());

        engine.switch_mode(Mode::LongBreak, t0);
        engine.start(t0).unwrap();
        engine.pause(t0 + secs(60)).unwrap();
        engine.reset(t0 + secs(61));
        assert_eq!(engine.mode(), Mode::LongBreak);
        assert_eq!((engine.run_state(), engine.seconds_remaining()), (RunState::Idle, 900));

        assert!(db.load_sessions().is_empty());
    }

    #[test]
    fn switch_mode_discards_running_interval() {
        let (mut engine, db, _) = engine();
        let t0 = morning();
        engine.start(t0).unwrap();
        let event = engine.switch_mode(Mode::ShortBreak, t0 + secs(1499));
        assert!(matches!(event, Event::ModeSwitched { mode: Mode::ShortBreak, seconds_remaining: 300, .. }));
        assert!(engine.tick(t0 + secs(1500)).is_none());
        assert!(db.load_sessions().is_empty());
    }

    #[test]
    fn settings_change_resizes_only_idle_engine() {
        let (mut engine, _, _) = engine();
        let t0 = morning();
        let mut longer = Settings::default();
        longer.work_minutes = 50;

        engine.on_settings_changed(longer.clone());
        assert_eq!(engine.seconds_remaining(), 3000);

        engine.start(t0).unwrap();
        let mut shorter = longer.clone();
        shorter.work_minutes = 10;
        engine.on_settings_changed(shorter);
        assert_eq!(engine.deadline(), Some(t0 + secs(3000)));
        engine.pause(t0 + secs(60)).unwrap();
        engine.on_settings_changed(longer);
        assert_eq!(engine.seconds_remaining(), 2940);
    }

    #[test]
    fn zero_duration_completes_on_next_tick() {
        let mut settings = Settings::default();
        settings.short_break_minutes = 0;
        let (mut engine, _, _) = engine_with(settings);
        let t0 = morning();
        engine.switch_mode(Mode::ShortBreak, t0);
        assert_eq!(engine.seconds_remaining(), 0);
        engine.start(t0).unwrap();
        assert!(matches!(engine.tick(t0), Some(Event::IntervalCompleted { .. })));
    }

    #[test]
    fn notification_failure_is_swallowed() {
        let db = Arc::new(Database::open_memory().unwrap());
        let mut engine = IntervalEngine::new(Settings::default(), db.clone(), Arc::new(BrokenNotifier));
        let t0 = morning();
        engine.start(t0).unwrap();
        assert!(engine.tick(t0 + secs(1500)).is_some());
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(db.load_sessions().len(), 1);
    }

    #[test]
    fn sound_disabled_skips_notification() {
        let mut settings = Settings::default();
        settings.sound_enabled = false;
        let (mut engine, _, notifier) = engine_with(settings);
        let t0 = morning();
        engine.start(t0).unwrap();
        engine.tick(t0 + secs(1500)).unwrap();
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn restore_repairs_inconsistent_state() {
        let db: Arc<dyn Store> = Arc::new(Database::open_memory().unwrap());
        let notifier: Arc<dyn Notifier> = Arc::new(CountingNotifier::default());

        let dangling = EngineState {
            mode: Mode::Work,
            run_state: RunState::Running,
            seconds_remaining: 42,
            deadline_ms: None,
        };
        let engine =
            IntervalEngine::restore(dangling, Settings::default(), db.clone(), notifier.clone());
        assert_eq!(engine.run_state(), RunState::Paused);
        assert_eq!(engine.seconds_remaining(), 42);

        let stale_idle = EngineState {
            mode: Mode::ShortBreak,
            run_state: RunState::Idle,
            seconds_remaining: 7,
            deadline_ms: Some(1),
        };
        let engine = IntervalEngine::restore(stale_idle, Settings::default(), db, notifier);
        assert_eq!(engine.seconds_remaining(), 300);
        assert!(engine.deadline().is_none());
    }

    #[test]
    fn snapshot_event_reports_progress() {
        let (mut engine, _, _) = engine();
        let t0 = morning();
        engine.start(t0).unwrap();
        engine.tick(t0 + secs(375));
        match engine.snapshot_event(t0) {
            Event::StateSnapshot {
                run_state,
                seconds_remaining,
                total_seconds,
                progress_pct,
                display,
                ..
            } => {
                assert_eq!(run_state, RunState::Running);
                assert_eq!(seconds_remaining, 1125);
                assert_eq!(total_seconds, 1500);
                assert!((progress_pct - 25.0).abs() < f64::EPSILON);
                assert_eq!(display, "18:45");
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn engine_state_roundtrips_through_json() {
        let (mut engine, _, _) = engine();
        engine.start(morning()).unwrap();
        let json = serde_json::to_string(&engine.state()).unwrap();
        let back: EngineState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, engine.state());
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(300), "05:00");
        assert_eq!(format_clock(6005), "100:05");
    }
}
