use chrono::{TimeZone, Utc};
use clap::Subcommand;
use salat_notify_core::error::Result;
use salat_notify_core::{BadgeCounter, HistoryStore};

use super::Context;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List delivered notifications, newest first
    List {
        /// Output raw JSON records
        #[arg(long)]
        json: bool,
    },
    /// Mark a notification read
    MarkRead {
        /// History id (`<numericId>_<deliveredAt>`)
        id: String,
    },
}

pub fn run(action: HistoryAction) -> Result<()> {
    let ctx = Context::open()?;
    let history = HistoryStore::with_capacity(&ctx.db, ctx.config.history.max_entries);

    match action {
        HistoryAction::List { json } => {
            let records = history.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            let read = history.read_ids()?;
            for record in records {
                let marker = if record.is_scheduled {
                    "~"
                } else if read.contains(&record.id) {
                    " "
                } else {
                    "*"
                };
                let at = Utc
                    .timestamp_millis_opt(record.delivered_at)
                    .single()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| record.delivered_at.to_string());
                println!("{marker} {:<24} {at}  {}", record.id, record.title);
            }
        }
        HistoryAction::MarkRead { id } => {
            if history.mark_read(&id)? {
                println!("marked read: {id}");
            } else {
                println!("unchanged: {id}");
            }
            println!("badge: {}", BadgeCounter::new(&ctx.db).current()?);
        }
    }
    Ok(())
}

pub fn badge() -> Result<()> {
    let ctx = Context::open()?;
    println!("{}", BadgeCounter::new(&ctx.db).current()?);
    Ok(())
}
