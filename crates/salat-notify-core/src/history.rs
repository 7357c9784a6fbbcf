//! Delivered-notification history.
//!
//! The log is a newest-first JSON array under [`keys::HISTORY`], capped at
//! [`MAX_HISTORY`] entries. Insertion is first-write-wins on `id`, which is
//! what makes duplicate or concurrent delivery of the same firing safe.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::badge::BadgeCounter;
use crate::category::Category;
use crate::error::PersistenceError;
use crate::storage::{keys, read_json, update_json, KvStore};

/// Maximum number of records kept in the log.
pub const MAX_HISTORY: usize = 100;

/// One delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// `<numericId>_<deliveredAt>`; unique per firing.
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub type_code: i32,
    /// Epoch millis set at render time.
    #[serde(rename = "timestamp", alias = "deliveredAt")]
    pub delivered_at: i64,
    #[serde(default)]
    pub is_read: bool,
    /// Placeholder entries never count toward the badge.
    #[serde(default)]
    pub is_scheduled: bool,
}

impl NotificationRecord {
    /// Record for a firing of logical notification `numeric_id` at `delivered_at`.
    pub fn delivered(
        numeric_id: i32,
        title: impl Into<String>,
        body: impl Into<String>,
        type_code: i32,
        delivered_at: i64,
    ) -> Self {
        Self {
            id: Self::delivery_id(numeric_id, delivered_at),
            title: title.into(),
            body: body.into(),
            type_code,
            delivered_at,
            is_read: false,
            is_scheduled: false,
        }
    }

    pub fn delivery_id(numeric_id: i32, delivered_at: i64) -> String {
        format!("{numeric_id}_{delivered_at}")
    }

    pub fn category(&self) -> Category {
        Category::from_code(self.type_code)
    }
}

/// Result of [`HistoryStore::append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appended {
    /// The record was prepended; `len` is the log length after trimming.
    Inserted { len: usize },
    /// A record with the same id already existed; nothing was written.
    Duplicate,
}

/// Append-with-dedup history log over a [`KvStore`].
pub struct HistoryStore<'a> {
    store: &'a dyn KvStore,
    max_entries: usize,
}

impl<'a> HistoryStore<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self::with_capacity(store, MAX_HISTORY)
    }

    /// Capacity is clamped to `1..=MAX_HISTORY`.
    pub fn with_capacity(store: &'a dyn KvStore, max_entries: usize) -> Self {
        Self {
            store,
            max_entries: max_entries.clamp(1, MAX_HISTORY),
        }
    }

    /// Prepend `record` unless its id is already logged, then trim to capacity.
    ///
    /// The badge is recomputed afterwards in both cases. A failed recompute
    /// is logged and left for the next mutation to heal, since the log write
    /// itself has already committed.
    ///
    /// # Errors
    /// Returns an error if the log cannot be read, decoded or written.
    pub fn append(&self, record: NotificationRecord) -> Result<Appended, PersistenceError> {
        let id = record.id.clone();
        let max_entries = self.max_entries;
        let mut pending = Some(record);
        let mut outcome = Appended::Duplicate;

        update_json::<Vec<NotificationRecord>, _>(self.store, keys::HISTORY, |log| {
            let Some(record) = pending.take() else {
                return false;
            };
            if log.iter().any(|existing| existing.id == record.id) {
                outcome = Appended::Duplicate;
                return false;
            }
            log.insert(0, record);
            log.truncate(max_entries);
            outcome = Appended::Inserted { len: log.len() };
            true
        })?;

        match outcome {
            Appended::Inserted { len } => info!(%id, len, "notification saved to history"),
            Appended::Duplicate => debug!(%id, "notification already in history"),
        }

        if let Err(e) = BadgeCounter::new(self.store).recompute() {
            warn!(error = %e, "badge recompute after append failed");
        }
        Ok(outcome)
    }

    /// Mark `id` as read. Returns `false` if the id is unknown or already read.
    ///
    /// # Errors
    /// Returns an error if the log or read set cannot be read or written.
    pub fn mark_read(&self, id: &str) -> Result<bool, PersistenceError> {
        if !self.list()?.iter().any(|record| record.id == id) {
            debug!(%id, "mark_read on unknown id ignored");
            return Ok(false);
        }

        let mut added = false;
        update_json::<Vec<String>, _>(self.store, keys::READ_IDS, |ids| {
            if ids.iter().any(|existing| existing == id) {
                return false;
            }
            ids.push(id.to_string());
            added = true;
            true
        })?;

        let badge = BadgeCounter::new(self.store).recompute()?;
        info!(%id, added, badge, "notification marked read");
        Ok(added)
    }

    /// The full log, newest first.
    pub fn list(&self) -> Result<Vec<NotificationRecord>, PersistenceError> {
        read_json(self.store, keys::HISTORY)
    }

    /// Ids the UI has marked read.
    pub fn read_ids(&self) -> Result<HashSet<String>, PersistenceError> {
        let ids: Vec<String> = read_json(self.store, keys::READ_IDS)?;
        Ok(ids.into_iter().collect())
    }

    pub fn len(&self) -> Result<usize, PersistenceError> {
        Ok(self.list()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, PersistenceError> {
        Ok(self.list()?.is_empty())
    }
}
