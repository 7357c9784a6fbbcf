mod config;
pub mod database;

pub use config::{AuditConfig, BatteryConfig, Config, HistoryConfig, HostConfig, NotificationsConfig};
pub use database::{Database, KvStore};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::PersistenceError;

/// Persisted key names. Every key is written independently; there are no
/// cross-key transactions.
pub mod keys {
    /// JSON array of `NotificationRecord`, newest first.
    pub const HISTORY: &str = "notification_history";
    /// Integer unread count.
    pub const BADGE_COUNT: &str = "notification_badge_count";
    /// JSON array of record ids the UI marked read.
    pub const READ_IDS: &str = "read_notifications";
    /// Boolean set by the host to force a rearm on the next tick.
    pub const NEEDS_RESCHEDULE: &str = "needs_reschedule";
    /// Epoch millis of the last completed scheduling pass.
    pub const LAST_SCHEDULE: &str = "last_notification_schedule";

    pub const PLATFORM_CHANNELS: &str = "platform_channels";
    pub const PLATFORM_ACTIVE: &str = "platform_active_notifications";
    pub const PLATFORM_JOBS: &str = "platform_jobs";
}

/// Returns the data directory for the store and config file.
///
/// `SALAT_NOTIFY_DATA_DIR` wins when set. Otherwise `~/.config/salat-notify[-dev]/`
/// based on `SALAT_NOTIFY_ENV` (set it to `dev` for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("SALAT_NOTIFY_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("SALAT_NOTIFY_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("salat-notify-dev")
            } else {
                base_dir.join("salat-notify")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Decode a JSON value stored under `key`, or `T::default()` if absent.
pub(crate) fn read_json<T, S>(store: &S, key: &str) -> Result<T, PersistenceError>
where
    T: DeserializeOwned + Default,
    S: KvStore + ?Sized,
{
    match store.get(key)? {
        Some(raw) => decode_json(key, &raw),
        None => Ok(T::default()),
    }
}

pub(crate) fn decode_json<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, PersistenceError> {
    serde_json::from_str(raw).map_err(|e| PersistenceError::serialization(key, e))
}

pub(crate) fn encode_json<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, PersistenceError> {
    serde_json::to_string(value).map_err(|e| PersistenceError::serialization(key, e))
}

/// Read-modify-write a JSON value under `key` as one critical section.
///
/// `f` returns `true` when it changed the value and it must be written back.
pub(crate) fn update_json<T, S>(
    store: &S,
    key: &str,
    mut f: impl FnMut(&mut T) -> bool,
) -> Result<(), PersistenceError>
where
    T: DeserializeOwned + Serialize + Default,
    S: KvStore + ?Sized,
{
    store.update(key, &mut |current| {
        let mut value: T = match current {
            Some(raw) => decode_json(key, &raw)?,
            None => T::default(),
        };
        if f(&mut value) {
            Ok(Some(encode_json(key, &value)?))
        } else {
            Ok(None)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_json_defaults_when_missing() {
        let db = Database::open_memory().unwrap();
        let ids: Vec<String> = read_json(&db, keys::READ_IDS).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn read_json_reports_corrupt_value() {
        let db = Database::open_memory().unwrap();
        db.set(keys::READ_IDS, "not json").unwrap();
        let result: Result<Vec<String>, _> = read_json(&db, keys::READ_IDS);
        assert!(matches!(
            result,
            Err(PersistenceError::Serialization { ref key, .. }) if key == keys::READ_IDS
        ));
    }

    #[test]
    fn update_json_skips_write_when_unchanged() {
        let db = Database::open_memory().unwrap();
        update_json::<Vec<String>, _>(&db, keys::READ_IDS, |_| false).unwrap();
        assert!(db.get(keys::READ_IDS).unwrap().is_none());

        update_json::<Vec<String>, _>(&db, keys::READ_IDS, |ids| {
            ids.push("a".into());
            true
        })
        .unwrap();
        assert_eq!(db.get(keys::READ_IDS).unwrap().as_deref(), Some(r#"["a"]"#));
    }

    #[test]
    fn data_dir_honours_override() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested");
        std::env::set_var("SALAT_NOTIFY_DATA_DIR", &target);
        let dir = data_dir().unwrap();
        std::env::remove_var("SALAT_NOTIFY_DATA_DIR");
        assert_eq!(dir, target);
        assert!(target.is_dir());
    }
}
