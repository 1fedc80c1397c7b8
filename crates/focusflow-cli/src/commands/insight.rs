use chrono::Local;
use focusflow_core::insight;
use focusflow_core::stats::today_summary;
use focusflow_core::storage::{Database, Store};
use focusflow_core::Config;
use serde_json::json;

use super::print_json;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let summary = today_summary(&db.load_sessions(), &Local::now());

    let text = insight::get_insight(&config.insight, summary).await;
    print_json(&json!({
        "count": summary.count,
        "totalMinutes": summary.total_minutes,
        "insight": text,
    }))
}
