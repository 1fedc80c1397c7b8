use clap::Subcommand;
use focusflow_core::storage::{Database, Store};
use focusflow_core::Settings;
use serde_json::json;

use super::print_json;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a setting (e.g. "workMinutes", "autoStartBreaks")
    Get {
        key: String,
    },
    /// Set a setting; the new value is validated before saving
    Set {
        key: String,
        value: String,
    },
    /// List all settings
    List,
    /// Reset settings to defaults
    Reset,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SettingsAction::Get { key } => {
            let settings = db.load_settings();
            match settings.get(&key) {
                Some(value) => print_json(&json!({ "key": key, "value": value }))?,
                None => return Err(format!("unknown setting: {key}").into()),
            }
        }
        SettingsAction::Set { key, value } => {
            let mut settings = db.load_settings();
            settings.set(&key, &value)?;
            db.save_settings(&settings)?;
            print_json(&settings)?;
        }
        SettingsAction::List => print_json(&db.load_settings())?,
        SettingsAction::Reset => {
            let settings = Settings::default();
            db.save_settings(&settings)?;
            print_json(&settings)?;
        }
    }
    Ok(())
}
