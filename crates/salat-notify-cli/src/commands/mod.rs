pub mod battery;
pub mod boot;
pub mod config;
pub mod deliver;
pub mod health;
pub mod history;
pub mod jobs;
pub mod tick;

use salat_notify_core::error::Result;
use salat_notify_core::{Config, Database, LocalPlatform, SystemClock};
use tracing::warn;

/// State shared by every invocation: the store, config and wall clock.
pub struct Context {
    pub db: Database,
    pub config: Config,
    pub clock: SystemClock,
}

impl Context {
    pub fn open() -> Result<Self> {
        Ok(Self {
            db: Database::open()?,
            config: Config::load()?,
            clock: SystemClock,
        })
    }

    /// Like [`Context::open`], but an unreadable config falls back to defaults.
    pub fn open_lenient() -> Result<Self> {
        let config = Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "config unreadable, using defaults");
            Config::default()
        });
        Ok(Self {
            db: Database::open()?,
            config,
            clock: SystemClock,
        })
    }

    pub fn platform(&self) -> LocalPlatform<'_> {
        LocalPlatform::new(&self.db, &self.clock)
            .with_optimization_exempt(self.config.battery.optimization_exempt)
    }
}
