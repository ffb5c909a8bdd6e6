//! SMS command line: schema migration and activity reports.

mod config;

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use sms_actions::ActionService;
use sms_db::{DbManager, SurrealStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Debug, Parser)]
#[command(name = "sms", version, about = "Sensor management system administration")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "sms.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Print activity log entries per day as JSON.
    Activity {
        /// First day to include (YYYY-MM-DD).
        #[arg(long)]
        earliest: NaiveDate,
        /// Last day to include (YYYY-MM-DD).
        #[arg(long)]
        latest: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::load(&cli.config)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    info!(config = %cli.config.display(), "Starting sms");

    let manager = DbManager::connect_and_migrate(&config.database).await?;

    match cli.command {
        Command::Migrate => {
            info!("Schema is up to date");
        }
        Command::Activity { earliest, latest } => {
            let store = SurrealStore::new(manager.client().clone());
            let service = ActionService::new(store, config.to_oracle());
            let (from, until) = day_range(earliest, latest)?;
            let counts = service.daily_activity(from, until).await?;
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
    }

    Ok(())
}

/// First and last instant (UTC) of the days `earliest..=latest`.
fn day_range(
    earliest: NaiveDate,
    latest: NaiveDate,
) -> anyhow::Result<(DateTime<Utc>, DateTime<Utc>)> {
    let last_instant =
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).context("invalid end of day")?;
    Ok((
        earliest.and_time(NaiveTime::MIN).and_utc(),
        latest.and_time(last_instant).and_utc(),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn day_range_covers_the_final_nanosecond() {
        let day = NaiveDate::from_ymd_opt(2023, 3, 5).unwrap();
        let (from, until) = day_range(day, day).unwrap();

        assert_eq!(from, Utc.with_ymd_and_hms(2023, 3, 5, 0, 0, 0).unwrap());
        let next_midnight = Utc.with_ymd_and_hms(2023, 3, 6, 0, 0, 0).unwrap();
        assert_eq!(until + Duration::nanoseconds(1), next_midnight);
        assert!(next_midnight - Duration::microseconds(1) < until);
    }
}
