//! Desktop stand-ins for the platform services.
//!
//! `LocalPlatform` keeps channels, shown notifications and periodic jobs in
//! the same key/value store as the core, so they outlive a single process the
//! way the OS equivalents do. `OpenLauncher` resumes the host through its
//! configured entry point, a URL or an executable path.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    Clock, ExistingJobPolicy, HostLauncher, JobScheduler, LaunchRequest, NotificationPlatform,
    PeriodicJobSpec, PlatformError, PlatformNotification, PowerManager, RegisteredJob, TapAction,
    RESCHEDULE_ARG, RESCHEDULE_EXTRA,
};
use crate::category::ChannelSpec;
use crate::error::{LaunchError, RenderError};
use crate::storage::{keys, read_json, update_json, KvStore};

/// What the local notification shade currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveNotification {
    pub slot: i32,
    pub channel_id: String,
    pub title: String,
    pub body: String,
    pub posted_at_ms: i64,
    pub tap: TapAction,
}

/// Store-backed platform for desktop runs and tests.
pub struct LocalPlatform<'a> {
    store: &'a dyn KvStore,
    clock: &'a dyn Clock,
    optimization_exempt: bool,
}

impl<'a> LocalPlatform<'a> {
    pub fn new(store: &'a dyn KvStore, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            clock,
            optimization_exempt: true,
        }
    }

    pub fn with_optimization_exempt(mut self, exempt: bool) -> Self {
        self.optimization_exempt = exempt;
        self
    }

    /// Notifications currently shown, ordered by slot.
    pub fn active(&self) -> Result<Vec<ActiveNotification>, PlatformError> {
        let shade: BTreeMap<i32, ActiveNotification> = read_json(self.store, keys::PLATFORM_ACTIVE)?;
        Ok(shade.into_values().collect())
    }

    pub fn channels(&self) -> Result<Vec<ChannelSpec>, PlatformError> {
        let channels: BTreeMap<String, ChannelSpec> =
            read_json(self.store, keys::PLATFORM_CHANNELS)?;
        Ok(channels.into_values().collect())
    }
}

impl NotificationPlatform for LocalPlatform<'_> {
    fn ensure_channel(&self, spec: &ChannelSpec) -> Result<(), RenderError> {
        update_json::<BTreeMap<String, ChannelSpec>, _>(
            self.store,
            keys::PLATFORM_CHANNELS,
            |channels| {
                if channels.contains_key(&spec.id) {
                    return false;
                }
                debug!(channel = %spec.id, name = %spec.name, "creating notification channel");
                channels.insert(spec.id.clone(), spec.clone());
                true
            },
        )
        .map_err(|_| RenderError::ChannelUnavailable(spec.id.clone()))
    }

    fn emit(&self, notification: &PlatformNotification) -> Result<(), RenderError> {
        let shown = ActiveNotification {
            slot: notification.slot,
            channel_id: notification.channel_id.clone(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            posted_at_ms: notification.when_ms,
            tap: notification.tap.clone(),
        };
        update_json::<BTreeMap<i32, ActiveNotification>, _>(
            self.store,
            keys::PLATFORM_ACTIVE,
            |shade| {
                shade.insert(shown.slot, shown.clone());
                true
            },
        )
        .map_err(|e| RenderError::Refused {
            slot: notification.slot,
            reason: e.to_string(),
        })
    }
}

impl JobScheduler for LocalPlatform<'_> {
    fn enqueue_unique_periodic(
        &self,
        spec: &PeriodicJobSpec,
        policy: ExistingJobPolicy,
    ) -> Result<RegisteredJob, PlatformError> {
        let now = self.clock.now_ms();
        let candidate = RegisteredJob {
            id: uuid::Uuid::new_v4(),
            name: spec.name.clone(),
            interval_secs: spec.interval.as_secs(),
            initial_delay_secs: spec.initial_delay.as_secs(),
            registered_at_ms: now,
            first_run_at_ms: now.saturating_add(
                i64::try_from(spec.initial_delay.as_millis()).unwrap_or(i64::MAX),
            ),
        };

        let mut result = candidate.clone();
        update_json::<Vec<RegisteredJob>, _>(self.store, keys::PLATFORM_JOBS, |jobs| {
            let existing = jobs.iter().position(|job| job.name == candidate.name);
            match (existing, policy) {
                (Some(index), ExistingJobPolicy::Keep) => {
                    result = jobs[index].clone();
                    false
                }
                (Some(index), ExistingJobPolicy::Replace) => {
                    jobs[index] = candidate.clone();
                    true
                }
                (None, _) => {
                    jobs.push(candidate.clone());
                    true
                }
            }
        })?;
        Ok(result)
    }

    fn registered(&self) -> Result<Vec<RegisteredJob>, PlatformError> {
        Ok(read_json(self.store, keys::PLATFORM_JOBS)?)
    }
}

impl PowerManager for LocalPlatform<'_> {
    fn is_ignoring_battery_optimizations(&self) -> bool {
        self.optimization_exempt
    }

    fn request_exemption(&self) -> Result<(), PlatformError> {
        info!("battery optimization exemption requested");
        Ok(())
    }

    fn open_optimization_settings(&self) -> Result<(), PlatformError> {
        info!("battery optimization settings requested");
        Ok(())
    }
}

/// Where a launch goes once the entry point is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    /// Handed to the desktop opener; the reschedule flag rides in the query.
    Url(String),
    /// Spawned directly; the reschedule flag rides on the command line.
    Program { path: PathBuf, args: Vec<String> },
}

/// Resumes the host through its entry point (URL or executable path).
#[derive(Debug, Clone, Default)]
pub struct OpenLauncher {
    entry_point: Option<String>,
}

impl OpenLauncher {
    pub fn new(entry_point: Option<String>) -> Self {
        Self { entry_point }
    }

    /// Resolve the entry point for `request`, if the host can be located.
    ///
    /// Paths must exist on disk.
    pub fn target(&self, request: &LaunchRequest) -> Result<LaunchTarget, LaunchError> {
        let entry = self
            .entry_point
            .as_deref()
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .ok_or(LaunchError::HostNotFound)?;

        if entry.contains("://") {
            if !request.resume_and_reschedule {
                return Ok(LaunchTarget::Url(entry.to_string()));
            }
            let separator = if entry.contains('?') { '&' } else { '?' };
            return Ok(LaunchTarget::Url(format!(
                "{entry}{separator}{RESCHEDULE_EXTRA}=true"
            )));
        }

        let path = PathBuf::from(entry);
        if !path.exists() {
            return Err(LaunchError::HostNotFound);
        }
        let args = if request.resume_and_reschedule {
            vec![RESCHEDULE_ARG.to_string()]
        } else {
            Vec::new()
        };
        Ok(LaunchTarget::Program { path, args })
    }
}

impl HostLauncher for OpenLauncher {
    fn launch(&self, request: &LaunchRequest) -> Result<(), LaunchError> {
        match self.target(request)? {
            LaunchTarget::Url(url) => {
                open::that_detached(&url).map_err(|e| LaunchError::Refused(e.to_string()))?;
                info!(%url, "host application launched");
            }
            LaunchTarget::Program { path, args } => {
                Command::new(&path)
                    .args(&args)
                    .spawn()
                    .map_err(|e| LaunchError::Refused(e.to_string()))?;
                info!(path = %path.display(), ?args, "host application launched");
            }
        }
        Ok(())
    }
}
