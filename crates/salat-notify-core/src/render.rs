//! Alarm-fired render path.
//!
//! ## Steps
//!
//! ```text
//! ensure channel -> pick assets -> build tap action -> emit -> record history
//! ```
//!
//! Every step degrades on its own. Nothing here returns an error to the alarm
//! handler: failures are logged and collected in the [`DeliveryReport`].

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::category::{Category, ChannelSpec, Sound, DEFAULT_TYPE_CODE, VIBRATION_PATTERN};
use crate::error::{CoreError, RenderError};
use crate::history::{Appended, HistoryStore, NotificationRecord, MAX_HISTORY};
use crate::platform::{
    BodyStyle, Clock, NotificationKind, NotificationPlatform, PlatformNotification, Priority,
    TapAction,
};
use crate::storage::KvStore;

/// Channel key used when neither the request nor config names one.
pub const DEFAULT_CHANNEL: &str = "default";

fn default_type_code() -> i32 {
    DEFAULT_TYPE_CODE
}
fn default_true() -> bool {
    true
}

/// Inbound alarm payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    #[serde(default)]
    pub numeric_id: i32,
    /// Empty titles are replaced by the application name.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Empty means the renderer's default channel.
    #[serde(default)]
    pub channel_key: String,
    #[serde(rename = "type", default = "default_type_code")]
    pub type_code: i32,
    #[serde(default)]
    pub payload: String,
    #[serde(default = "default_true")]
    pub play_sound: bool,
    #[serde(default = "default_true")]
    pub vibrate: bool,
}

impl NotificationRequest {
    pub fn new(numeric_id: i32, title: impl Into<String>, type_code: i32) -> Self {
        Self {
            numeric_id,
            title: title.into(),
            body: String::new(),
            channel_key: String::new(),
            type_code,
            payload: String::new(),
            play_sound: true,
            vibrate: true,
        }
    }

    pub fn category(&self) -> Category {
        Category::from_code(self.type_code)
    }
}

/// What happened during one delivery.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    /// The notification reached the platform.
    pub shown: bool,
    pub delivered_at: i64,
    /// History id, set once the notification was shown.
    pub record_id: Option<String>,
    pub history: Option<Appended>,
    /// Recovered failures, in step order.
    pub failures: Vec<CoreError>,
}

impl DeliveryReport {
    pub fn is_clean(&self) -> bool {
        self.shown && self.failures.is_empty()
    }
}

/// Builds, emits and records notifications.
pub struct NotificationRenderer<'a> {
    platform: &'a dyn NotificationPlatform,
    store: &'a dyn KvStore,
    clock: &'a dyn Clock,
    app_name: String,
    default_channel: String,
    max_history: usize,
}

impl<'a> NotificationRenderer<'a> {
    pub fn new(
        platform: &'a dyn NotificationPlatform,
        store: &'a dyn KvStore,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            platform,
            store,
            clock,
            app_name: "Bekal Muslim".into(),
            default_channel: DEFAULT_CHANNEL.into(),
            max_history: MAX_HISTORY,
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Channel used when a request does not name one.
    pub fn with_default_channel(mut self, channel_key: impl Into<String>) -> Self {
        self.default_channel = channel_key.into();
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Show `request` and record it in history.
    pub fn deliver(&self, request: &NotificationRequest) -> DeliveryReport {
        let mut report = DeliveryReport {
            delivered_at: self.clock.now_ms(),
            ..DeliveryReport::default()
        };
        let category = request.category();
        let title = if request.title.is_empty() {
            self.app_name.clone()
        } else {
            request.title.clone()
        };
        info!(id = request.numeric_id, %title, ?category, "delivering notification");

        let channel_key = if request.channel_key.is_empty() {
            &self.default_channel
        } else {
            &request.channel_key
        };
        let channel = ChannelSpec::for_key(channel_key, &self.app_name);
        if let Err(e) = self.platform.ensure_channel(&channel) {
            warn!(error = %e, channel = %channel.id, "channel setup failed, emitting anyway");
            report.failures.push(e.into());
        }

        let sound = if request.play_sound {
            Some(self.select_sound(category, &mut report))
        } else {
            None
        };

        let notification = PlatformNotification {
            slot: request.numeric_id,
            channel_id: channel.id,
            priority: Priority::Max,
            kind: NotificationKind::Alarm,
            title: title.clone(),
            body: request.body.clone(),
            style: BodyStyle::BigText,
            when_ms: report.delivered_at,
            sound,
            vibration: request.vibrate.then_some(VIBRATION_PATTERN),
            light: category.light(),
            tap: TapAction::open_app(request.numeric_id, request.payload.clone()),
            auto_cancel: false,
        };

        if let Err(e) = self.platform.emit(&notification) {
            error!(error = %e, id = request.numeric_id, "failed to show notification");
            report.failures.push(e.into());
            return report;
        }
        report.shown = true;

        let record = NotificationRecord::delivered(
            request.numeric_id,
            title,
            request.body.clone(),
            request.type_code,
            report.delivered_at,
        );
        report.record_id = Some(record.id.clone());

        match HistoryStore::with_capacity(self.store, self.max_history).append(record) {
            Ok(outcome) => report.history = Some(outcome),
            Err(e) => {
                error!(error = %e, id = request.numeric_id, "notification shown but not saved to history");
                report.failures.push(e.into());
            }
        }

        info!(id = request.numeric_id, failures = report.failures.len(), "notification shown");
        report
    }

    fn select_sound(&self, category: Category, report: &mut DeliveryReport) -> Sound {
        match category.sound() {
            Sound::Asset(asset) if !self.platform.asset_available(asset) => {
                warn!(%asset, "sound asset missing, using platform default");
                report
                    .failures
                    .push(RenderError::AssetUnavailable(asset.to_string()).into());
                Sound::PlatformDefault
            }
            sound => sound,
        }
    }
}
