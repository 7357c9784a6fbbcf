//! Periodic staleness audit.
//!
//! Alarms can silently vanish (reboot, OS cleanup, process death). The
//! periodic tick compares the last confirmed scheduling pass against now and
//! wakes the host when the schedule can no longer be trusted.
//!
//! ```text
//! Fresh --(time passes / flag set)--> Stale --(host rearms + confirms)--> Fresh
//! ```

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::AuditError;
use crate::health::ScheduleHealth;
use crate::platform::Clock;
use crate::reschedule::RescheduleTrigger;
use crate::storage::KvStore;

/// Default age, in whole hours, beyond which a schedule is stale.
pub const STALE_AFTER_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Fresh,
    Stale,
}

/// Outcome reported to the host's periodic job runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobResult {
    Success,
    /// Re-run with the runner's own backoff.
    Retry,
}

/// Stale iff the host forced it or more than `stale_after_hours` whole hours
/// have passed since the last pass.
pub fn decide(health: &ScheduleHealth, now_ms: i64, stale_after_hours: i64) -> Decision {
    if health.needs_reschedule || health.hours_since(now_ms) > stale_after_hours {
        Decision::Stale
    } else {
        Decision::Fresh
    }
}

pub struct StalenessAuditor<'a> {
    store: &'a dyn KvStore,
    clock: &'a dyn Clock,
    stale_after_hours: i64,
}

impl<'a> StalenessAuditor<'a> {
    pub fn new(store: &'a dyn KvStore, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            clock,
            stale_after_hours: STALE_AFTER_HOURS,
        }
    }

    pub fn with_stale_after_hours(mut self, hours: i64) -> Self {
        self.stale_after_hours = hours;
        self
    }

    /// Read schedule health and decide. No side effects.
    pub fn audit(&self) -> Result<Decision, AuditError> {
        let health = ScheduleHealth::load(self.store)?;
        let now = self.clock.now_ms();
        let decision = decide(&health, now, self.stale_after_hours);
        info!(
            ?decision,
            hours_since = health.hours_since(now),
            needs_reschedule = health.needs_reschedule,
            "schedule audited"
        );
        Ok(decision)
    }

    /// One periodic tick.
    ///
    /// A failed trigger still reports `Success` so the runner keeps the job
    /// alive; the next tick tries again. Only an audit failure asks for retry.
    pub fn run(&self, trigger: &RescheduleTrigger<'_>) -> JobResult {
        match self.audit() {
            Ok(Decision::Fresh) => JobResult::Success,
            Ok(Decision::Stale) => {
                if !trigger.trigger() {
                    warn!("schedule is stale but the host could not be resumed");
                }
                JobResult::Success
            }
            Err(e) => {
                error!(error = %e, "staleness audit failed");
                JobResult::Retry
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LaunchError;
    use crate::health::MILLIS_PER_HOUR;
    use crate::platform::{FixedClock, HostLauncher, LaunchRequest};
    use crate::storage::{keys, Database};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const NOW: i64 = 1_700_000_000_000;

    fn health(hours_ago: i64, needs_reschedule: bool) -> ScheduleHealth {
        ScheduleHealth {
            last_schedule_timestamp: NOW - hours_ago * MILLIS_PER_HOUR,
            needs_reschedule,
        }
    }

    struct CountingLauncher {
        calls: AtomicUsize,
        fail: bool,
    }

    impl HostLauncher for CountingLauncher {
        fn launch(&self, _request: &LaunchRequest) -> Result<(), LaunchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(LaunchError::Refused("background launch blocked".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn threshold_boundaries() {
        assert_eq!(decide(&health(25, false), NOW, 24), Decision::Stale);
        assert_eq!(decide(&health(23, false), NOW, 24), Decision::Fresh);
        assert_eq!(decide(&health(24, false), NOW, 24), Decision::Fresh);
    }

    #[test]
    fn flag_forces_stale() {
        for hours in [0, 1, 23, 25, 1000] {
            assert_eq!(decide(&health(hours, true), NOW, 24), Decision::Stale);
        }
    }

    #[test]
    fn never_scheduled_is_stale() {
        assert_eq!(decide(&ScheduleHealth::default(), NOW, 24), Decision::Stale);
    }

    #[test]
    fn run_triggers_only_when_stale() {
        let db = Database::open_memory().unwrap();
        let clock = FixedClock::new(NOW);
        let launcher = CountingLauncher {
            calls: AtomicUsize::new(0),
            fail: false,
        };
        let trigger = RescheduleTrigger::new(&launcher);
        let auditor = StalenessAuditor::new(&db, &clock);

        ScheduleHealth::confirm_scheduled(&db, NOW - MILLIS_PER_HOUR).unwrap();
        assert_eq!(auditor.run(&trigger), JobResult::Success);
        assert_eq!(launcher.calls.load(Ordering::SeqCst), 0);

        ScheduleHealth::set_needs_reschedule(&db, true).unwrap();
        assert_eq!(auditor.run(&trigger), JobResult::Success);
        assert_eq!(launcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_trigger_is_still_success() {
        let db = Database::open_memory().unwrap();
        let clock = FixedClock::new(NOW);
        let launcher = CountingLauncher {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        let auditor = StalenessAuditor::new(&db, &clock);
        assert_eq!(auditor.run(&RescheduleTrigger::new(&launcher)), JobResult::Success);
        assert_eq!(launcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unreadable_health_asks_for_retry() {
        let db = Database::open_memory().unwrap();
        db.set(keys::NEEDS_RESCHEDULE, "maybe").unwrap();
        let clock = FixedClock::new(NOW);
        let launcher = CountingLauncher {
            calls: AtomicUsize::new(0),
            fail: false,
        };
        let auditor = StalenessAuditor::new(&db, &clock);
        assert_eq!(auditor.run(&RescheduleTrigger::new(&launcher)), JobResult::Retry);
        assert_eq!(launcher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn audit_does_not_write_health() {
        let db = Database::open_memory().unwrap();
        let clock = FixedClock::new(NOW);
        StalenessAuditor::new(&db, &clock).audit().unwrap();
        assert!(db.get(keys::LAST_SCHEDULE).unwrap().is_none());
        assert!(db.get(keys::NEEDS_RESCHEDULE).unwrap().is_none());
    }

    #[test]
    fn custom_threshold() {
        let db = Database::open_memory().unwrap();
        let clock = FixedClock::new(NOW);
        ScheduleHealth::confirm_scheduled(&db, NOW - 13 * MILLIS_PER_HOUR).unwrap();
        let auditor = StalenessAuditor::new(&db, &clock).with_stale_after_hours(12);
        assert_eq!(auditor.audit().unwrap(), Decision::Stale);
    }
}
