//! Async countdown driver.
//!
//! Wraps an [`IntervalEngine`] and keeps at most one ticker task alive while
//! the engine is running. Each ticker cycle reads the clock and calls
//! `tick()`; commands that stop or replace the countdown cancel the ticker
//! before they touch the engine. A generation counter, checked under the
//! engine lock, makes any cycle already in flight a no-op once cancelled.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, trace};

use super::clock::Clock;
use super::engine::{IntervalEngine, TimerSnapshot};
use super::mode::{Mode, RunState};
use crate::events::Event;
use crate::settings::Settings;

const EVENT_CAPACITY: usize = 64;

struct Shared {
    engine: IntervalEngine,
    /// Bumped whenever the ticker is cancelled.
    generation: u64,
}

pub struct TimerService {
    shared: Arc<Mutex<Shared>>,
    ticker: StdMutex<Option<JoinHandle<()>>>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    events: broadcast::Sender<Event>,
    snapshots: watch::Sender<TimerSnapshot>,
}

impl TimerService {
    pub fn new(engine: IntervalEngine, clock: Arc<dyn Clock>, poll_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (snapshots, _) = watch::channel(engine.snapshot());
        Self {
            shared: Arc::new(Mutex::new(Shared {
                engine,
                generation: 0,
            })),
            ticker: StdMutex::new(None),
            clock,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
            events,
            snapshots,
        }
    }

    /// Every event the engine produces, including completions from the ticker.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Latest snapshot, refreshed on every ticker cycle and command.
    pub fn watch(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        self.shared.lock().await.engine.snapshot()
    }

    pub async fn snapshot_event(&self) -> Event {
        self.shared.lock().await.engine.snapshot_event(self.clock.now())
    }

    /// Engine state for persisting; see [`IntervalEngine::state`].
    pub async fn engine_state(&self) -> super::engine::EngineState {
        self.shared.lock().await.engine.state()
    }

    /// Whether a ticker task is currently alive.
    pub fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub async fn start(&self) -> Option<Event> {
        let mut shared = self.shared.lock().await;
        let event = shared.engine.start(self.clock.now());
        self.after_command(&mut shared, event)
    }

    pub async fn pause(&self) -> Option<Event> {
        let mut shared = self.shared.lock().await;
        self.cancel_ticker(&mut shared);
        let event = shared.engine.pause(self.clock.now());
        self.after_command(&mut shared, event)
    }

    pub async fn reset(&self) -> Event {
        let mut shared = self.shared.lock().await;
        self.cancel_ticker(&mut shared);
        let event = shared.engine.reset(self.clock.now());
        self.after_command(&mut shared, Some(event.clone()));
        event
    }

    pub async fn switch_mode(&self, mode: Mode) -> Event {
        let mut shared = self.shared.lock().await;
        self.cancel_ticker(&mut shared);
        let event = shared.engine.switch_mode(mode, self.clock.now());
        self.after_command(&mut shared, Some(event.clone()));
        event
    }

    /// Forward saved settings to the engine. A running countdown is untouched.
    pub async fn apply_settings(&self, settings: Settings) {
        let mut shared = self.shared.lock().await;
        shared.engine.on_settings_changed(settings);
        self.snapshots.send_replace(shared.engine.snapshot());
    }

    /// Stop the ticker without changing engine state.
    pub async fn shutdown(&self) {
        let mut shared = self.shared.lock().await;
        self.cancel_ticker(&mut shared);
    }

    /// Restart the ticker when a command left the engine running, then publish.
    /// An engine restored already running gets its first ticker here too.
    fn after_command(&self, shared: &mut Shared, event: Option<Event>) -> Option<Event> {
        let running = shared.engine.run_state() == RunState::Running;
        if running && (event.is_some() || !self.is_ticking()) {
            self.cancel_ticker(shared);
            self.spawn_ticker(shared.generation);
        }
        self.snapshots.send_replace(shared.engine.snapshot());
        if let Some(event) = &event {
            let _ = self.events.send(event.clone());
        }
        event
    }

    /// Abort the ticker and invalidate any cycle already past its await point.
    /// Must be called with the engine lock held, before mutating the engine.
    fn cancel_ticker(&self, shared: &mut Shared) {
        shared.generation = shared.generation.wrapping_add(1);
        if let Some(handle) = self.ticker.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
            debug!(generation = shared.generation, "ticker cancelled");
        }
    }

    fn spawn_ticker(&self, generation: u64) {
        let shared = Arc::clone(&self.shared);
        let clock = Arc::clone(&self.clock);
        let events = self.events.clone();
        let snapshots = self.snapshots.clone();
        let poll_interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;

                let (event, running) = {
                    let mut guard = shared.lock().await;
                    if guard.generation != generation {
                        trace!(generation, "stale ticker exiting");
                        break;
                    }
                    let event = guard.engine.tick(clock.now());
                    snapshots.send_replace(guard.engine.snapshot());
                    (event, guard.engine.run_state() == RunState::Running)
                };

                if let Some(event) = event {
                    let _ = events.send(event);
                }
                if !running {
                    break;
                }
            }
        });

        let mut slot = self.ticker.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = slot.replace(handle) {
            old.abort();
        }
        debug!(generation, "ticker spawned");
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.get_mut().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
    }
}
