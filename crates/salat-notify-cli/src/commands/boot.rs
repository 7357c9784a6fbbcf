use salat_notify_core::error::Result;
use salat_notify_core::{audit_job_spec, BootOutcome, BootRecoveryHandler};

use super::Context;

pub fn run(action: &str) -> Result<()> {
    let ctx = Context::open_lenient()?;
    let platform = ctx.platform();
    let handler = BootRecoveryHandler::new(&platform, audit_job_spec(&ctx.config.audit));

    match handler.on_action(action) {
        BootOutcome::Registered(job) => println!("{}", serde_json::to_string_pretty(&job)?),
        BootOutcome::Ignored => println!("ignored: {action}"),
        BootOutcome::Failed(reason) => println!("job registration failed: {reason}"),
    }
    Ok(())
}
