use clap::Subcommand;
use salat_notify_core::error::Result;
use salat_notify_core::HostCommands;

use super::Context;

#[derive(Subcommand)]
pub enum BatteryAction {
    /// Whether battery optimization is disabled for the app
    Status,
    /// Ask for an exemption (no-op if already exempt)
    Request,
    /// Open the optimization settings screen
    Settings,
}

pub fn run(action: BatteryAction) -> Result<()> {
    let ctx = Context::open()?;
    let platform = ctx.platform();
    let host = HostCommands::new(&ctx.db, &ctx.clock, &platform);

    match action {
        BatteryAction::Status => println!("{}", host.is_battery_optimization_disabled()),
        BatteryAction::Request => println!("{}", host.request_battery_optimization_exemption()),
        BatteryAction::Settings => host.open_battery_optimization_settings(),
    }
    Ok(())
}
