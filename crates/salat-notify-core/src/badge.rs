//! Unread badge derived from history and the read set.

use std::collections::HashSet;

use tracing::debug;

use crate::error::PersistenceError;
use crate::history::NotificationRecord;
use crate::storage::{keys, read_json, KvStore};

/// Count records that are delivered (not placeholders) and not yet read.
pub fn count_unread(log: &[NotificationRecord], read_ids: &HashSet<String>) -> u32 {
    log.iter()
        .filter(|record| !record.is_scheduled && !read_ids.contains(&record.id))
        .count() as u32
}

/// Recomputes and persists the badge under [`keys::BADGE_COUNT`].
pub struct BadgeCounter<'a> {
    store: &'a dyn KvStore,
}

impl<'a> BadgeCounter<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    /// Rescan history and the read set and persist the unread count.
    ///
    /// Always reads both keys fresh, so running it again after an
    /// interrupted mutation converges on the right value.
    pub fn recompute(&self) -> Result<u32, PersistenceError> {
        let log: Vec<NotificationRecord> = read_json(self.store, keys::HISTORY)?;
        let read: Vec<String> = read_json(self.store, keys::READ_IDS)?;
        let read_ids: HashSet<String> = read.into_iter().collect();

        let unread = count_unread(&log, &read_ids);
        self.store.set(keys::BADGE_COUNT, &unread.to_string())?;
        debug!(unread, "badge count updated");
        Ok(unread)
    }

    /// Last persisted badge value; `0` before the first recompute.
    pub fn current(&self) -> Result<u32, PersistenceError> {
        match self.store.get(keys::BADGE_COUNT)? {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| PersistenceError::storage(keys::BADGE_COUNT, e)),
            None => Ok(0),
        }
    }
}
