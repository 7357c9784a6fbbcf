//! Commands the host application calls into the core.
//!
//! The host owns the actual prayer-time schedule. It reads the badge, marks
//! entries read, flags or confirms scheduling passes, manages the battery
//! exemption, and registers the periodic audit after onboarding.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::badge::BadgeCounter;
use crate::boot::{BootOutcome, BootRecoveryHandler};
use crate::error::PersistenceError;
use crate::health::ScheduleHealth;
use crate::history::HistoryStore;
use crate::platform::{Clock, JobScheduler, PeriodicJobSpec, PowerManager};
use crate::storage::KvStore;

/// Snapshot for the host's status screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStatus {
    pub badge: u32,
    pub history_len: usize,
    pub health: ScheduleHealth,
    pub battery_optimization_disabled: bool,
}

pub struct HostCommands<'a> {
    store: &'a dyn KvStore,
    clock: &'a dyn Clock,
    power: &'a dyn PowerManager,
    max_history: usize,
}

impl<'a> HostCommands<'a> {
    pub fn new(store: &'a dyn KvStore, clock: &'a dyn Clock, power: &'a dyn PowerManager) -> Self {
        Self {
            store,
            clock,
            power,
            max_history: crate::history::MAX_HISTORY,
        }
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    fn history(&self) -> HistoryStore<'a> {
        HistoryStore::with_capacity(self.store, self.max_history)
    }

    pub fn badge(&self) -> Result<u32, PersistenceError> {
        BadgeCounter::new(self.store).current()
    }

    pub fn mark_read(&self, id: &str) -> Result<bool, PersistenceError> {
        self.history().mark_read(id)
    }

    /// Force (or stop forcing) a rearm on the next audit tick.
    pub fn set_needs_reschedule(&self, needed: bool) -> Result<(), PersistenceError> {
        ScheduleHealth::set_needs_reschedule(self.store, needed)
    }

    /// Confirm a fully completed scheduling pass as of now.
    pub fn confirm_schedule(&self) -> Result<i64, PersistenceError> {
        let now = self.clock.now_ms();
        ScheduleHealth::confirm_scheduled(self.store, now)?;
        Ok(now)
    }

    pub fn schedule_health(&self) -> Result<ScheduleHealth, PersistenceError> {
        ScheduleHealth::load(self.store)
    }

    pub fn is_battery_optimization_disabled(&self) -> bool {
        self.power.is_ignoring_battery_optimizations()
    }

    /// Returns `true` if already exempt or the prompt was shown.
    pub fn request_battery_optimization_exemption(&self) -> bool {
        if self.power.is_ignoring_battery_optimizations() {
            info!("battery optimization already disabled");
            return true;
        }
        match self.power.request_exemption() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "battery exemption request failed");
                false
            }
        }
    }

    pub fn open_battery_optimization_settings(&self) {
        if let Err(e) = self.power.open_optimization_settings() {
            warn!(error = %e, "could not open battery optimization settings");
        }
    }

    /// Register the periodic audit once onboarding is done. Same job, same
    /// replace policy as boot recovery.
    pub fn setup_periodic_work(&self, scheduler: &dyn JobScheduler, spec: PeriodicJobSpec) -> BootOutcome {
        BootRecoveryHandler::new(scheduler, spec).register()
    }

    pub fn status(&self) -> Result<HostStatus, PersistenceError> {
        Ok(HostStatus {
            badge: self.badge()?,
            history_len: self.history().len()?,
            health: self.schedule_health()?,
            battery_optimization_disabled: self.is_battery_optimization_disabled(),
        })
    }
}
