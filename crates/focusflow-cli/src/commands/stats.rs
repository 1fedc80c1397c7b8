use chrono::Local;
use clap::Subcommand;
use focusflow_core::stats::{daily_minutes_histogram, daily_progress, totals, DEFAULT_HISTOGRAM_DAYS};
use focusflow_core::storage::{Database, Store};
use serde_json::json;

use super::print_json;

const MAX_HISTOGRAM_DAYS: i64 = 366;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's sessions against the daily target
    Today,
    /// Focus minutes per day, oldest first
    Week {
        /// Number of days, ending today (1 to 366)
        #[arg(long, default_value_t = DEFAULT_HISTOGRAM_DAYS, value_parser = clap::value_parser!(u32).range(1..=MAX_HISTOGRAM_DAYS))]
        days: u32,
    },
    /// All-time stats
    All,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let log = db.load_sessions();
    let now = Local::now();

    match action {
        StatsAction::Today => {
            let target = db.load_settings().target_sessions_per_day;
            let progress = daily_progress(&log, &now, target);
            print_json(&json!({
                "date": now.date_naive(),
                "count": progress.count,
                "target": progress.target,
                "focusedMinutes": progress.focused_minutes,
                "targetReached": progress.target_reached,
            }))?;
        }
        StatsAction::Week { days } => {
            print_json(&daily_minutes_histogram(&log, &now, days))?;
        }
        StatsAction::All => print_json(&totals(&log))?,
    }
    Ok(())
}
