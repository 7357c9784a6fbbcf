use clap::Subcommand;
use salat_notify_core::audit::decide;
use salat_notify_core::error::Result;
use salat_notify_core::{Clock, HostCommands};
use serde_json::json;

use super::Context;

#[derive(Subcommand)]
pub enum HealthAction {
    /// Show schedule health and the current audit decision
    Show,
    /// Confirm a completed scheduling pass as of now
    Confirm,
    /// Set or clear the force-reschedule flag
    Flag {
        #[command(subcommand)]
        action: FlagAction,
    },
}

#[derive(Subcommand)]
pub enum FlagAction {
    Set,
    Clear,
}

pub fn run(action: HealthAction) -> Result<()> {
    let ctx = Context::open()?;
    let platform = ctx.platform();
    let host = HostCommands::new(&ctx.db, &ctx.clock, &platform);

    match action {
        HealthAction::Show => {
            let health = host.schedule_health()?;
            let now = ctx.clock.now_ms();
            let out = json!({
                "lastScheduleTimestamp": health.last_schedule_timestamp,
                "needsReschedule": health.needs_reschedule,
                "hoursSince": health.hours_since(now),
                "decision": decide(&health, now, ctx.config.audit.stale_after_hours),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        HealthAction::Confirm => {
            let at = host.confirm_schedule()?;
            println!("confirmed at {at}");
        }
        HealthAction::Flag { action } => {
            let needed = matches!(action, FlagAction::Set);
            host.set_needs_reschedule(needed)?;
            println!("needs_reschedule = {needed}");
        }
    }
    Ok(())
}
