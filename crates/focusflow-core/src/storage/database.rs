//! SQLite-backed persistence gateway.
//!
//! Every record is a JSON document in a single key-value table:
//! - `settings`: the user's [`Settings`]
//! - `sessions`: the ordered session log
//! - `timer_engine`: engine state the CLI carries between invocations

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{data_dir, Store};
use crate::error::StorageError;
use crate::session::Session;
use crate::settings::Settings;

pub const SETTINGS_KEY: &str = "settings";
pub const SESSIONS_KEY: &str = "sessions";
pub const ENGINE_KEY: &str = "timer_engine";

/// SQLite database holding the key-value records.
///
/// The connection sits behind a mutex so every write, including the
/// read-append-rewrite of the session log, has a single writer.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `<data_dir>/focusflow.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("focusflow.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened database");
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests and throwaway runs).
    pub fn open_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    /// Get a raw value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock()?;
        kv_get(&conn, key)
    }

    /// Set a raw value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        kv_set(&conn, key, value)
    }

    /// Read and decode a JSON record. Absent, unreadable and corrupt records
    /// all come back as `None`.
    pub fn load_record<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.kv_get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "failed to read record, treating as absent");
                return None;
            }
        };
        decode(key, &raw)
    }

    /// Encode and overwrite a JSON record.
    pub fn save_record<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = encode(key, value)?;
        self.kv_set(key, &json)
    }
}

impl Store for Database {
    fn load_settings(&self) -> Settings {
        self.load_record(SETTINGS_KEY).unwrap_or_default()
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        self.save_record(SETTINGS_KEY, settings)
    }

    fn load_sessions(&self) -> Vec<Session> {
        self.load_record(SESSIONS_KEY).unwrap_or_default()
    }

    fn append_session(&self, session: &Session) -> Result<Vec<Session>, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut log: Vec<Session> = kv_get(&tx, SESSIONS_KEY)?
            .and_then(|raw| decode(SESSIONS_KEY, &raw))
            .unwrap_or_default();
        log.push(session.clone());

        kv_set(&tx, SESSIONS_KEY, &encode(SESSIONS_KEY, &log)?)?;
        tx.commit()?;

        debug!(id = %session.id, total = log.len(), "appended session");
        Ok(log)
    }
}

fn kv_get(conn: &Connection, key: &str) -> Result<Option<String>, StorageError> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get::<_, String>(0)
        })
        .optional()?;
    Ok(value)
}

fn kv_set(conn: &Connection, key: &str, value: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "corrupt record, treating as absent");
            None
        }
    }
}
