mod config;
pub mod database;
pub(crate) mod json_path;

pub use config::{Config, InsightConfig, NotificationsConfig, TimerConfig};
pub use database::{Database, ENGINE_KEY, SESSIONS_KEY, SETTINGS_KEY};

use std::path::PathBuf;

use crate::error::StorageError;
use crate::session::Session;
use crate::settings::Settings;

/// The persistence gateway: two independent records, settings and the
/// session log.
///
/// Reads never fail; absent or corrupt records come back as defaults.
/// Writes report errors so callers can decide whether to log or surface them.
pub trait Store: Send + Sync {
    fn load_settings(&self) -> Settings;

    /// Overwrite the settings record wholesale.
    fn save_settings(&self, settings: &Settings) -> Result<(), StorageError>;

    fn load_sessions(&self) -> Vec<Session>;

    /// Append to the session log and return the log as committed.
    ///
    /// The read-back happens under the same write lock, so the result always
    /// includes `session` and every entry committed before it.
    fn append_session(&self, session: &Session) -> Result<Vec<Session>, StorageError>;
}

/// Returns the data directory, creating it if needed.
///
/// `FOCUSFLOW_DATA_DIR` wins outright. Otherwise `~/.config/focusflow`, or
/// `~/.config/focusflow-dev` when `FOCUSFLOW_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("FOCUSFLOW_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("FOCUSFLOW_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusflow-dev")
            } else {
                base_dir.join("focusflow")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
