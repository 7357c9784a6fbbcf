//! TOML-based configuration.
//!
//! Stores tunables for the notification core:
//! - History cap
//! - Staleness threshold and periodic audit cadence
//! - Host application entry point used to resume and reschedule
//! - Notification fallbacks (default channel, app name)
//! - Desktop stand-in for the battery-optimization answer
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

/// Staleness audit and periodic job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// A schedule older than this many hours is stale.
    #[serde(default = "default_stale_after_hours")]
    pub stale_after_hours: i64,
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
    #[serde(default = "default_initial_delay_minutes")]
    pub initial_delay_minutes: u64,
    /// Unique name of the periodic job; re-registration replaces by name.
    #[serde(default = "default_job_name")]
    pub job_name: String,
}

/// Host application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HostConfig {
    /// URL or path opened to resume the host application.
    /// When unset the host cannot be located and relaunch fails.
    #[serde(default)]
    pub entry_point: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_channel")]
    pub default_channel: String,
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryConfig {
    #[serde(default = "default_true")]
    pub optimization_exempt: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub battery: BatteryConfig,
}

fn default_max_entries() -> usize {
    crate::history::MAX_HISTORY
}
fn default_stale_after_hours() -> i64 {
    24
}
fn default_interval_hours() -> u64 {
    6
}
fn default_initial_delay_minutes() -> u64 {
    15
}
fn default_job_name() -> String {
    "PrayerNotificationScheduler".into()
}
fn default_channel() -> String {
    crate::render::DEFAULT_CHANNEL.into()
}
fn default_app_name() -> String {
    "Bekal Muslim".into()
}
fn default_true() -> bool {
    true
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            stale_after_hours: default_stale_after_hours(),
            interval_hours: default_interval_hours(),
            initial_delay_minutes: default_initial_delay_minutes(),
            job_name: default_job_name(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            default_channel: default_channel(),
            app_name: default_app_name(),
        }
    }
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            optimization_exempt: true,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => value
                    .parse::<i64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?,
                // Optional strings serialize as null until first set.
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from `<data_dir>/config.toml`, writing defaults if it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if it is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to `<data_dir>/config.toml`.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check ranges that serde alone cannot express.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let out_of_range = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let max = crate::history::MAX_HISTORY;
        if !(1..=max).contains(&self.history.max_entries) {
            return Err(out_of_range(
                "history.max_entries",
                format!("must be between 1 and {max}"),
            ));
        }
        if self.audit.stale_after_hours < 1 {
            return Err(out_of_range("audit.stale_after_hours", "must be at least 1".into()));
        }
        if self.audit.interval_hours == 0 {
            return Err(out_of_range("audit.interval_hours", "must be at least 1".into()));
        }
        Ok(())
    }
}
