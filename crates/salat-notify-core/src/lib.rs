//! # salat-notify Core Library
//!
//! Notification lifecycle for prayer-time reminders: emitting a notification
//! once per alarm, logging it into a capped, deduplicated history, keeping the
//! unread badge in step, and noticing when the alarm schedule has gone stale.
//!
//! ## Architecture
//!
//! Every entry point is a short, stateless handler invoked by the OS (or the
//! CLI standing in for it):
//!
//! - **Alarm fired**: [`NotificationRenderer::deliver`]
//! - **Boot signal**: [`BootRecoveryHandler::on_boot`]
//! - **Periodic tick**: [`StalenessAuditor::run`]
//! - **Host commands**: [`HostCommands`]
//!
//! All persisted state lives behind [`KvStore`], with per-key atomicity only.
//!
//! ```text
//! boot -> audit job -> (stale) -> host rearms -> alarm -> render -> history -> badge
//! ```

pub mod audit;
pub mod badge;
pub mod boot;
pub mod category;
pub mod error;
pub mod health;
pub mod history;
pub mod host;
pub mod platform;
pub mod render;
pub mod reschedule;
pub mod storage;

pub use audit::{Decision, JobResult, StalenessAuditor};
pub use badge::BadgeCounter;
pub use boot::{audit_job_spec, BootOutcome, BootRecoveryHandler, BootSignal};
pub use category::{Category, ChannelSpec, Sound};
pub use error::{AuditError, ConfigError, CoreError, LaunchError, PersistenceError, RenderError};
pub use health::ScheduleHealth;
pub use history::{Appended, HistoryStore, NotificationRecord, MAX_HISTORY};
pub use host::{HostCommands, HostStatus};
pub use platform::{Clock, FixedClock, LocalPlatform, OpenLauncher, SystemClock};
pub use render::{DeliveryReport, NotificationRenderer, NotificationRequest};
pub use reschedule::{LaunchReason, RescheduleTrigger};
pub use storage::{Config, Database, KvStore};
