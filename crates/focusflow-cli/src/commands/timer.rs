use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use focusflow_core::storage::{Database, Store, ENGINE_KEY};
use focusflow_core::timer::{format_clock, EngineState, IntervalEngine, Mode, SystemClock, TimerService};
use focusflow_core::{Config, Event, Notifier, SilentNotifier, TerminalBell};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use super::print_json;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the countdown
    Start,
    /// Pause the running countdown
    Pause,
    /// Go back to the full duration of the current mode
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Switch to another mode (work, short-break, long-break)
    Mode {
        mode: Mode,
    },
    /// Run the countdown in the foreground until the interval ends (Ctrl-C pauses)
    Run,
}

fn notifier(config: &Config) -> Arc<dyn Notifier> {
    if config.notifications.bell {
        Arc::new(TerminalBell)
    } else {
        Arc::new(SilentNotifier)
    }
}

fn load_engine(db: &Arc<Database>, notifier: Arc<dyn Notifier>) -> IntervalEngine {
    let settings = db.load_settings();
    match db.load_record::<EngineState>(ENGINE_KEY) {
        Some(state) => IntervalEngine::restore(state, settings, db.clone(), notifier),
        None => IntervalEngine::new(settings, db.clone(), notifier),
    }
}

fn save_engine(db: &Database, state: &EngineState) -> Result<(), Box<dyn std::error::Error>> {
    db.save_record(ENGINE_KEY, state)?;
    debug!(mode = %state.mode, run_state = ?state.run_state, "engine state saved");
    Ok(())
}

pub async fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Arc::new(Database::open()?);
    let mut engine = load_engine(&db, notifier(&config));

    // An interval that ran out while no process was watching completes first.
    let now = Utc::now();
    if let Some(event) = engine.tick(now) {
        print_json(&event)?;
    }

    match action {
        TimerAction::Start => match engine.start(now) {
            Some(event) => print_json(&event)?,
            None => print_json(&engine.snapshot_event(now))?,
        },
        TimerAction::Pause => match engine.pause(now) {
            Some(event) => print_json(&event)?,
            None => print_json(&engine.snapshot_event(now))?,
        },
        TimerAction::Reset => print_json(&engine.reset(now))?,
        TimerAction::Status => print_json(&engine.snapshot_event(now))?,
        TimerAction::Mode { mode } => print_json(&engine.switch_mode(mode, now))?,
        TimerAction::Run => {
            save_engine(&db, &engine.state())?;
            return run_foreground(db, engine, &config).await;
        }
    }

    save_engine(&db, &engine.state())
}

async fn run_foreground(
    db: Arc<Database>,
    engine: IntervalEngine,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let poll = Duration::from_millis(config.timer.poll_interval_ms);
    let service = TimerService::new(engine, Arc::new(SystemClock), poll);
    let mut events = service.subscribe();
    let mut snapshots = service.watch();

    if let Some(event) = service.start().await {
        print_json(&event)?;
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                if let Err(e) = res {
                    warn!(error = %e, "could not listen for Ctrl-C");
                }
                eprintln!();
                if let Some(event) = service.pause().await {
                    print_json(&event)?;
                }
                break;
            }
            received = events.recv() => match received {
                Ok(event @ Event::IntervalCompleted { .. }) => {
                    eprintln!();
                    print_json(&event)?;
                    save_engine(&db, &service.engine_state().await)?;
                    if let Event::IntervalCompleted { auto_started: false, .. } = event {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event receiver lagged"),
                Err(RecvError::Closed) => break,
            },
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = *snapshots.borrow_and_update();
                let mut err = std::io::stderr().lock();
                let _ = write!(err, "\r{:<11} {}", snap.mode.label(), format_clock(snap.seconds_remaining));
                let _ = err.flush();
            }
        }
    }

    service.shutdown().await;
    save_engine(&db, &service.engine_state().await)
}
