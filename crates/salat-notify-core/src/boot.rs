//! Boot recovery.
//!
//! Periodic jobs and alarms do not survive a reboot. On every boot signal the
//! audit job is registered again under its unique name with replace
//! semantics, so repeated signals never stack duplicate jobs.

use std::time::Duration;

use tracing::{debug, error, info};

use crate::platform::{ExistingJobPolicy, JobScheduler, PeriodicJobSpec, RegisteredJob};
use crate::storage::AuditConfig;

/// Boot broadcasts that trigger recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootSignal {
    BootCompleted,
    /// Vendor fast-boot equivalents.
    QuickBootPowerOn,
    HtcQuickBootPowerOn,
}

impl BootSignal {
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "android.intent.action.BOOT_COMPLETED" => Some(BootSignal::BootCompleted),
            "android.intent.action.QUICKBOOT_POWERON" => Some(BootSignal::QuickBootPowerOn),
            "com.htc.intent.action.QUICKBOOT_POWERON" => Some(BootSignal::HtcQuickBootPowerOn),
            _ => None,
        }
    }

    pub fn action(self) -> &'static str {
        match self {
            BootSignal::BootCompleted => "android.intent.action.BOOT_COMPLETED",
            BootSignal::QuickBootPowerOn => "android.intent.action.QUICKBOOT_POWERON",
            BootSignal::HtcQuickBootPowerOn => "com.htc.intent.action.QUICKBOOT_POWERON",
        }
    }
}

/// The periodic audit job as configured.
pub fn audit_job_spec(config: &AuditConfig) -> PeriodicJobSpec {
    PeriodicJobSpec {
        name: config.job_name.clone(),
        interval: Duration::from_secs(config.interval_hours.saturating_mul(3600)),
        initial_delay: Duration::from_secs(config.initial_delay_minutes.saturating_mul(60)),
    }
}

/// Result of handling one boot broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    /// Not a boot action we handle.
    Ignored,
    Registered(RegisteredJob),
    /// The scheduler refused; logged, retried at next boot or app open.
    Failed(String),
}

pub struct BootRecoveryHandler<'a> {
    scheduler: &'a dyn JobScheduler,
    spec: PeriodicJobSpec,
}

impl<'a> BootRecoveryHandler<'a> {
    pub fn new(scheduler: &'a dyn JobScheduler, spec: PeriodicJobSpec) -> Self {
        Self { scheduler, spec }
    }

    /// Handle a raw boot broadcast action.
    pub fn on_action(&self, action: &str) -> BootOutcome {
        match BootSignal::from_action(action) {
            Some(signal) => self.on_boot(signal),
            None => {
                debug!(%action, "ignoring non-boot broadcast");
                BootOutcome::Ignored
            }
        }
    }

    /// Re-register the periodic audit job. Does not redeliver anything.
    pub fn on_boot(&self, signal: BootSignal) -> BootOutcome {
        info!(action = signal.action(), "boot received");
        self.register()
    }

    /// Register (or replace) the audit job.
    pub fn register(&self) -> BootOutcome {
        match self
            .scheduler
            .enqueue_unique_periodic(&self.spec, ExistingJobPolicy::Replace)
        {
            Ok(job) => {
                info!(
                    name = %job.name,
                    interval_secs = job.interval_secs,
                    initial_delay_secs = job.initial_delay_secs,
                    "periodic audit job registered"
                );
                BootOutcome::Registered(job)
            }
            Err(e) => {
                error!(error = %e, "failed to register periodic audit job");
                BootOutcome::Failed(e.to_string())
            }
        }
    }
}
