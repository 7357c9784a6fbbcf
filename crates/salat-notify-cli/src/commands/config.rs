use clap::Subcommand;
use salat_notify_core::error::Result;
use salat_notify_core::storage::data_dir;
use salat_notify_core::{Config, ConfigError};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value by dot path (e.g. "audit.stale_after_hours")
    Get { key: String },
    /// Validate and persist one value (e.g. `host.entry_point bekal://home`)
    Set { key: String, value: String },
    /// Print the whole config as JSON
    List,
    /// Overwrite config.toml with defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {value}");
        }
        ConfigAction::List => {
            println!("{}", serde_json::to_string_pretty(&Config::load()?)?);
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("reset {}", data_dir()?.join("config.toml").display());
        }
    }
    Ok(())
}
