use salat_notify_core::error::Result;
use salat_notify_core::{JobResult, OpenLauncher, RescheduleTrigger, StalenessAuditor};
use tracing::error;

use super::Context;

/// Exit status telling the job runner to retry with backoff (EX_TEMPFAIL).
const EXIT_RETRY: i32 = 75;

pub fn run() -> Result<()> {
    let result = match Context::open() {
        Ok(ctx) => audit(&ctx),
        Err(e) => {
            error!(error = %e, "could not load state for the staleness audit");
            JobResult::Retry
        }
    };

    println!("{}", serde_json::to_string(&result)?);
    if result == JobResult::Retry {
        std::process::exit(EXIT_RETRY);
    }
    Ok(())
}

fn audit(ctx: &Context) -> JobResult {
    let launcher = OpenLauncher::new(ctx.config.host.entry_point.clone());
    let trigger = RescheduleTrigger::new(&launcher);

    StalenessAuditor::new(&ctx.db, &ctx.clock)
        .with_stale_after_hours(ctx.config.audit.stale_after_hours)
        .run(&trigger)
}
