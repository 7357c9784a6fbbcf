//! Schedule health: when the host last finished arming alarms, and whether it
//! asked for a forced rearm.
//!
//! The auditor only reads this. The host writes it through
//! [`ScheduleHealth::confirm_scheduled`] once a scheduling pass has fully
//! completed, and through [`ScheduleHealth::set_needs_reschedule`].

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PersistenceError;
use crate::storage::{keys, KvStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleHealth {
    /// Epoch millis of the last confirmed scheduling pass; `0` if never.
    pub last_schedule_timestamp: i64,
    pub needs_reschedule: bool,
}

impl ScheduleHealth {
    /// Read both health keys. Missing keys read as never-scheduled / not flagged.
    pub fn load(store: &dyn KvStore) -> Result<Self, PersistenceError> {
        let needs_reschedule = match store.get(keys::NEEDS_RESCHEDULE)? {
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .map_err(|e| PersistenceError::storage(keys::NEEDS_RESCHEDULE, e))?,
            None => false,
        };
        let last_schedule_timestamp = match store.get(keys::LAST_SCHEDULE)? {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|e| PersistenceError::storage(keys::LAST_SCHEDULE, e))?,
            None => 0,
        };
        Ok(Self {
            last_schedule_timestamp,
            needs_reschedule,
        })
    }

    /// Record a completed scheduling pass at `now_ms` and clear the force flag.
    ///
    /// Only call after every alarm of the pass has been armed; a partial pass
    /// must not make the schedule look fresh.
    pub fn confirm_scheduled(store: &dyn KvStore, now_ms: i64) -> Result<(), PersistenceError> {
        store.set(keys::LAST_SCHEDULE, &now_ms.to_string())?;
        store.set(keys::NEEDS_RESCHEDULE, "false")?;
        info!(last_schedule = now_ms, "scheduling pass confirmed");
        Ok(())
    }

    pub fn set_needs_reschedule(store: &dyn KvStore, needed: bool) -> Result<(), PersistenceError> {
        store.set(keys::NEEDS_RESCHEDULE, if needed { "true" } else { "false" })?;
        info!(needed, "force-reschedule flag updated");
        Ok(())
    }

    /// Whole hours elapsed since the last pass, truncated toward zero.
    pub fn hours_since(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.last_schedule_timestamp) / MILLIS_PER_HOUR
    }
}

pub(crate) const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;
