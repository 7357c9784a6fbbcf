//! SQLite-backed key/value store.
//!
//! Provides the process-wide persisted state of the notification core:
//! - Notification history and the read set
//! - The derived badge count
//! - Schedule health (last scheduling pass, force-reschedule flag)
//! - Desktop platform state (channels, shown notifications, periodic jobs)
//!
//! Each key is written on its own. `update` wraps a single key's
//! read-modify-write in an immediate transaction so overlapping invocations,
//! even from separate processes, serialize on that key.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::data_dir;
use crate::error::PersistenceError;

/// How long a writer waits for another invocation's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Narrow accessor over string-keyed persisted state.
pub trait KvStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Atomically read-modify-write one key.
    ///
    /// `f` receives the current value and returns `Some(new)` to write it or
    /// `None` to leave the key untouched.
    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Result<Option<String>, PersistenceError>,
    ) -> Result<(), PersistenceError>;
}

/// SQLite database holding the key/value table.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `<data_dir>/salat-notify.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, PersistenceError> {
        let dir = data_dir().map_err(|e| PersistenceError::storage("data_dir", e))?;
        Self::open_at(dir.join("salat-notify.db"))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| PersistenceError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (tests and dry runs).
    pub fn open_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| PersistenceError::storage(":memory:", e))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, PersistenceError> {
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| PersistenceError::storage("busy_timeout", e))?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), PersistenceError> {
        let conn = self.lock("migrate")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .map_err(|e| PersistenceError::from_sqlite("migrate", e))?;
        Ok(())
    }

    fn lock(&self, key: &str) -> Result<MutexGuard<'_, Connection>, PersistenceError> {
        self.conn
            .lock()
            .map_err(|_| PersistenceError::storage(key, "connection mutex poisoned"))
    }

    fn read(conn: &Connection, key: &str) -> Result<Option<String>, PersistenceError> {
        conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get::<_, String>(0)
        })
        .optional()
        .map_err(|e| PersistenceError::from_sqlite(key, e))
    }

    fn write(conn: &Connection, key: &str, value: &str) -> Result<(), PersistenceError> {
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .map_err(|e| PersistenceError::from_sqlite(key, e))?;
        Ok(())
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let conn = self.lock(key)?;
        Self::read(&conn, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let conn = self.lock(key)?;
        Self::write(&conn, key, value)
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Result<Option<String>, PersistenceError>,
    ) -> Result<(), PersistenceError> {
        let mut conn = self.lock(key)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| PersistenceError::from_sqlite(key, e))?;
        let current = Self::read(&tx, key)?;
        // Dropping `tx` on error rolls the transaction back.
        if let Some(next) = f(current)? {
            Self::write(&tx, key, &next)?;
        }
        tx.commit()
            .map_err(|e| PersistenceError::from_sqlite(key, e))?;
        Ok(())
    }
}
