use clap::Subcommand;
use salat_notify_core::error::Result;
use salat_notify_core::platform::JobScheduler;
use salat_notify_core::{audit_job_spec, BootOutcome, CoreError, HostCommands};

use super::Context;

#[derive(Subcommand)]
pub enum JobsAction {
    /// List registered periodic jobs
    List,
    /// Register the periodic audit job (after onboarding)
    Setup,
}

pub fn run(action: JobsAction) -> Result<()> {
    let ctx = Context::open()?;
    let platform = ctx.platform();

    match action {
        JobsAction::List => {
            let jobs = platform.registered().map_err(CoreError::platform)?;
            println!("{}", serde_json::to_string_pretty(&jobs)?);
        }
        JobsAction::Setup => {
            let host = HostCommands::new(&ctx.db, &ctx.clock, &platform);
            match host.setup_periodic_work(&platform, audit_job_spec(&ctx.config.audit)) {
                BootOutcome::Registered(job) => println!("{}", serde_json::to_string_pretty(&job)?),
                BootOutcome::Failed(reason) => return Err(CoreError::Platform(reason)),
                BootOutcome::Ignored => {}
            }
        }
    }
    Ok(())
}
