//! Seams to the operating system.
//!
//! The core never talks to a notification service, app launcher, job
//! scheduler or power manager directly. Each is a trait here so the alarm,
//! boot and tick handlers stay plain functions over injected collaborators.

mod local;

pub use local::{ActiveNotification, LaunchTarget, LocalPlatform, OpenLauncher};

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::category::{ChannelSpec, LightPattern, Sound};
use crate::error::{LaunchError, RenderError};

/// Action string carried by a notification tap back into the host.
pub const NOTIFICATION_CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Extra flag the host reads to know it was resumed to reschedule.
pub const RESCHEDULE_EXTRA: &str = "trigger_reschedule";

/// Command-line form of [`RESCHEDULE_EXTRA`] for hosts started by path.
pub const RESCHEDULE_ARG: &str = "--trigger-reschedule";

/// Boxed error used by platform services outside the render/launch paths.
pub type PlatformError = Box<dyn std::error::Error + Send + Sync>;

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Settable clock for tests and replays.
#[derive(Debug, Default)]
pub struct FixedClock {
    now_ms: AtomicI64,
}

impl FixedClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// What happens when the user taps a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapAction {
    /// Keyed by the notification's numeric id so a later delivery with the
    /// same id updates this tap target instead of adding another.
    pub request_code: i32,
    pub action: String,
    pub payload: String,
}

impl TapAction {
    pub fn open_app(request_code: i32, payload: impl Into<String>) -> Self {
        Self {
            request_code,
            action: NOTIFICATION_CLICK_ACTION.to_string(),
            payload: payload.into(),
        }
    }
}

/// Interruption level requested from the notification service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Default,
    Max,
}

/// System category, used by do-not-disturb rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Alarm,
    Reminder,
}

/// Body layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyStyle {
    SingleLine,
    BigText,
}

/// A fully built notification ready to be handed to the platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformNotification {
    /// Display slot; emitting into an occupied slot replaces it.
    pub slot: i32,
    pub channel_id: String,
    pub priority: Priority,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub style: BodyStyle,
    pub when_ms: i64,
    pub sound: Option<Sound>,
    pub vibration: Option<[u64; 4]>,
    pub light: LightPattern,
    pub tap: TapAction,
    pub auto_cancel: bool,
}

/// Platform notification service.
pub trait NotificationPlatform: Send + Sync {
    /// Create the channel if it does not exist yet.
    fn ensure_channel(&self, spec: &ChannelSpec) -> Result<(), RenderError>;

    /// Whether a bundled sound asset can be loaded.
    fn asset_available(&self, _asset: &str) -> bool {
        true // default: assets ship with the app
    }

    /// Show `notification` in its slot, replacing whatever occupies it.
    fn emit(&self, notification: &PlatformNotification) -> Result<(), RenderError>;
}

/// Signal sent to the host application's entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Resume and re-arm every alarm.
    pub resume_and_reschedule: bool,
}

/// Locates and starts the host application.
pub trait HostLauncher: Send + Sync {
    fn launch(&self, request: &LaunchRequest) -> Result<(), LaunchError>;
}

/// How to treat an existing job registered under the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingJobPolicy {
    Keep,
    Replace,
}

/// A recurring OS-managed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicJobSpec {
    pub name: String,
    pub interval: Duration,
    pub initial_delay: Duration,
}

/// A job as the scheduler currently holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredJob {
    pub id: uuid::Uuid,
    pub name: String,
    pub interval_secs: u64,
    pub initial_delay_secs: u64,
    pub registered_at_ms: i64,
    pub first_run_at_ms: i64,
}

/// OS periodic job scheduler.
pub trait JobScheduler: Send + Sync {
    fn enqueue_unique_periodic(
        &self,
        spec: &PeriodicJobSpec,
        policy: ExistingJobPolicy,
    ) -> Result<RegisteredJob, PlatformError>;

    fn registered(&self) -> Result<Vec<RegisteredJob>, PlatformError>;
}

/// Battery-optimization controls.
pub trait PowerManager: Send + Sync {
    fn is_ignoring_battery_optimizations(&self) -> bool;

    /// Show the exemption prompt. Fire-and-forget.
    fn request_exemption(&self) -> Result<(), PlatformError>;

    fn open_optimization_settings(&self) -> Result<(), PlatformError>;
}
