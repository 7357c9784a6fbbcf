use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "salat-notify",
    version,
    about = "Prayer-time notification lifecycle: deliver, record, audit, recover"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Alarm fired: show a notification and record it
    Deliver(commands::deliver::DeliverArgs),
    /// Boot signal: re-register the periodic audit job
    Boot {
        /// Boot broadcast action
        #[arg(long, default_value = "android.intent.action.BOOT_COMPLETED")]
        action: String,
    },
    /// Periodic tick: audit schedule staleness (exit 75 asks for retry)
    Tick,
    /// Notification history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Print the unread badge count
    Badge,
    /// Schedule health (host side)
    Health {
        #[command(subcommand)]
        action: commands::health::HealthAction,
    },
    /// Periodic jobs
    Jobs {
        #[command(subcommand)]
        action: commands::jobs::JobsAction,
    },
    /// Battery optimization
    Battery {
        #[command(subcommand)]
        action: commands::battery::BatteryAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Deliver(args) => commands::deliver::run(args),
        Commands::Boot { action } => commands::boot::run(&action),
        Commands::Tick => commands::tick::run(),
        Commands::History { action } => commands::history::run(action),
        Commands::Badge => commands::history::badge(),
        Commands::Health { action } => commands::health::run(action),
        Commands::Jobs { action } => commands::jobs::run(action),
        Commands::Battery { action } => commands::battery::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
