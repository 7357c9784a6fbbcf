//! Resuming the host application so it can re-arm its alarms.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::platform::{HostLauncher, LaunchRequest, NOTIFICATION_CLICK_ACTION, RESCHEDULE_ARG};

/// Wakes the host with a resume-and-reschedule signal.
///
/// Never touches schedule health: only the host, once it has re-armed every
/// alarm, confirms the new schedule.
pub struct RescheduleTrigger<'a> {
    launcher: &'a dyn HostLauncher,
}

impl<'a> RescheduleTrigger<'a> {
    pub fn new(launcher: &'a dyn HostLauncher) -> Self {
        Self { launcher }
    }

    /// Returns `true` if the launch was dispatched.
    pub fn trigger(&self) -> bool {
        let request = LaunchRequest {
            resume_and_reschedule: true,
        };
        match self.launcher.launch(&request) {
            Ok(()) => {
                info!("host triggered for rescheduling");
                true
            }
            Err(e) => {
                warn!(error = %e, "could not trigger host for rescheduling");
                false
            }
        }
    }
}

/// How the host was started, as seen from its entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaunchReason {
    /// Resumed by the staleness audit; the host must re-arm and confirm.
    Reschedule,
    /// The user tapped a notification.
    NotificationTap { payload: String },
    /// Anything else (launcher icon, recents).
    Plain,
}

impl LaunchReason {
    /// Classify an incoming launch from its action and extras.
    ///
    /// A reschedule request wins over a tap marker if both are present.
    pub fn classify(action: Option<&str>, trigger_reschedule: bool, payload: Option<&str>) -> Self {
        if trigger_reschedule {
            LaunchReason::Reschedule
        } else if action == Some(NOTIFICATION_CLICK_ACTION) {
            LaunchReason::NotificationTap {
                payload: payload.unwrap_or_default().to_string(),
            }
        } else {
            LaunchReason::Plain
        }
    }

    /// Classify a host started by path from its command line.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let trigger_reschedule = args.into_iter().any(|arg| arg.as_ref() == RESCHEDULE_ARG);
        Self::classify(None, trigger_reschedule, None)
    }
}
