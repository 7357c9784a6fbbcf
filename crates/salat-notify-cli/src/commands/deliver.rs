use clap::Args;
use salat_notify_core::error::Result;
use salat_notify_core::{NotificationRenderer, NotificationRequest};
use serde_json::json;

use super::Context;

#[derive(Args)]
pub struct DeliverArgs {
    /// Logical notification id (display slot)
    #[arg(long, required_unless_present = "request")]
    id: Option<i32>,
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    body: String,
    /// Channel key, e.g. prayer_critical_v10 (default: notifications.default_channel)
    #[arg(long)]
    channel: Option<String>,
    /// Category code (0-4 prayer slots, 7 dzikir, 8 tilawah, 10 doa)
    #[arg(long = "type", default_value_t = salat_notify_core::category::DEFAULT_TYPE_CODE)]
    type_code: i32,
    /// Data routed back to the host on tap
    #[arg(long, default_value = "")]
    payload: String,
    #[arg(long)]
    no_sound: bool,
    #[arg(long)]
    no_vibrate: bool,
    /// Full alarm payload as JSON; overrides the individual flags
    #[arg(long, conflicts_with = "id")]
    request: Option<String>,
}

impl DeliverArgs {
    fn into_request(self) -> Result<NotificationRequest, serde_json::Error> {
        if let Some(raw) = self.request {
            return serde_json::from_str(&raw);
        }
        Ok(NotificationRequest {
            numeric_id: self.id.unwrap_or_default(),
            title: self.title,
            body: self.body,
            channel_key: self.channel.unwrap_or_default(),
            type_code: self.type_code,
            payload: self.payload,
            play_sound: !self.no_sound,
            vibrate: !self.no_vibrate,
        })
    }
}

/// An alarm handler never fails its invocation; the report says what degraded.
pub fn run(args: DeliverArgs) -> Result<()> {
    let request = args.into_request()?;
    let ctx = Context::open_lenient()?;
    let platform = ctx.platform();

    let report = NotificationRenderer::new(&platform, &ctx.db, &ctx.clock)
        .with_app_name(ctx.config.notifications.app_name.clone())
        .with_default_channel(ctx.config.notifications.default_channel.clone())
        .with_max_history(ctx.config.history.max_entries)
        .deliver(&request);

    let summary = json!({
        "shown": report.shown,
        "recordId": report.record_id,
        "deliveredAt": report.delivered_at,
        "duplicate": matches!(report.history, Some(salat_notify_core::Appended::Duplicate)),
        "failures": report.failures.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
