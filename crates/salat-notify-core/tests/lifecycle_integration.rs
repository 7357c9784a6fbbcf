//! Integration tests for the full notification lifecycle.

use std::sync::Arc;
use std::time::Duration;

use salat_notify_core::platform::{HostLauncher, JobScheduler, LaunchRequest};
use salat_notify_core::storage::AuditConfig;
use salat_notify_core::{
    audit_job_spec, BadgeCounter, BootRecoveryHandler, BootSignal, Database, Decision,
    FixedClock, HistoryStore, HostCommands, JobResult, LaunchError, LocalPlatform,
    NotificationRenderer, NotificationRequest, RescheduleTrigger, StalenessAuditor, MAX_HISTORY,
};

const START: i64 = 1_700_000_000_000;
const HOUR_MS: i64 = 3_600_000;

struct NoHost;

impl HostLauncher for NoHost {
    fn launch(&self, _request: &LaunchRequest) -> Result<(), LaunchError> {
        Err(LaunchError::HostNotFound)
    }
}

#[test]
fn test_deliver_read_and_evict() {
    let db = Database::open_memory().unwrap();
    let clock = FixedClock::new(START);
    let platform = LocalPlatform::new(&db, &clock);
    let renderer = NotificationRenderer::new(&platform, &db, &clock);
    let history = HistoryStore::new(&db);
    let badge = BadgeCounter::new(&db);

    let mut subuh = NotificationRequest::new(1, "Subuh", 0);
    subuh.channel_key = "prayer_critical_v10".into();
    let report = renderer.deliver(&subuh);
    assert!(report.is_clean());
    let subuh_id = report.record_id.unwrap();

    let log = history.list().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(badge.current().unwrap(), 1);
    assert!(!log[0].is_read);

    assert!(history.mark_read(&subuh_id).unwrap());
    assert_eq!(badge.current().unwrap(), 0);

    for i in 0..MAX_HISTORY as i32 {
        clock.advance(Duration::from_millis(1));
        renderer.deliver(&NotificationRequest::new(100 + i, format!("Dzikir {i}"), 7));
    }

    let log = history.list().unwrap();
    assert_eq!(log.len(), MAX_HISTORY);
    assert!(log.iter().all(|record| record.id != subuh_id));
    assert_eq!(badge.current().unwrap(), MAX_HISTORY as u32);
}

#[test]
fn test_stale_cycle_until_host_confirms() {
    let db = Database::open_memory().unwrap();
    let clock = FixedClock::new(START);
    let platform = LocalPlatform::new(&db, &clock);
    let host = HostCommands::new(&db, &clock, &platform);
    let auditor = StalenessAuditor::new(&db, &clock);
    let launcher = NoHost;
    let trigger = RescheduleTrigger::new(&launcher);

    host.confirm_schedule().unwrap();
    assert_eq!(auditor.audit().unwrap(), Decision::Fresh);

    clock.set(START + 23 * HOUR_MS);
    assert_eq!(auditor.audit().unwrap(), Decision::Fresh);

    clock.set(START + 25 * HOUR_MS);
    assert_eq!(auditor.audit().unwrap(), Decision::Stale);
    // Host missing: the tick still succeeds and health is left alone.
    assert_eq!(auditor.run(&trigger), JobResult::Success);
    assert_eq!(auditor.audit().unwrap(), Decision::Stale);

    host.confirm_schedule().unwrap();
    assert_eq!(auditor.audit().unwrap(), Decision::Fresh);

    host.set_needs_reschedule(true).unwrap();
    assert_eq!(auditor.audit().unwrap(), Decision::Stale);
}

#[test]
fn test_double_boot_keeps_single_job() {
    let db = Database::open_memory().unwrap();
    let clock = FixedClock::new(START);
    let platform = LocalPlatform::new(&db, &clock);
    let handler = BootRecoveryHandler::new(&platform, audit_job_spec(&AuditConfig::default()));

    handler.on_boot(BootSignal::BootCompleted);
    handler.on_boot(BootSignal::BootCompleted);

    let jobs = platform.registered().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].interval_secs, 6 * 3600);
}

#[test]
fn test_state_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("salat-notify.db");
    let clock = FixedClock::new(START);

    {
        let db = Database::open_at(&path).unwrap();
        let platform = LocalPlatform::new(&db, &clock);
        NotificationRenderer::new(&platform, &db, &clock)
            .deliver(&NotificationRequest::new(2, "Dzuhur", 1));
    }

    let db = Database::open_at(&path).unwrap();
    assert_eq!(HistoryStore::new(&db).len().unwrap(), 1);
    assert_eq!(BadgeCounter::new(&db).current().unwrap(), 1);
    assert_eq!(LocalPlatform::new(&db, &clock).active().unwrap().len(), 1);
}

#[test]
fn test_concurrent_duplicate_delivery_records_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("salat-notify.db");
    let clock = Arc::new(FixedClock::new(START));
    // Create the schema before the racing invocations start.
    Database::open_at(&path).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let path = path.clone();
            let clock = Arc::clone(&clock);
            std::thread::spawn(move || {
                let db = Database::open_at(&path).unwrap();
                let platform = LocalPlatform::new(&db, clock.as_ref());
                NotificationRenderer::new(&platform, &db, clock.as_ref())
                    .deliver(&NotificationRequest::new(3, "Ashar", 2))
                    .shown
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }

    let db = Database::open_at(&path).unwrap();
    let log = HistoryStore::new(&db).list().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].id, format!("3_{START}"));
    assert_eq!(BadgeCounter::new(&db).recompute().unwrap(), 1);
}

#[test]
fn test_placeholder_entries_never_count() {
    let db = Database::open_memory().unwrap();
    let history = HistoryStore::new(&db);
    let mut placeholder =
        salat_notify_core::NotificationRecord::delivered(4, "Maghrib", "", 3, START);
    placeholder.is_scheduled = true;
    history.append(placeholder).unwrap();
    assert_eq!(BadgeCounter::new(&db).current().unwrap(), 0);
}
