//! Session window check.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use deltaflow_core::ConfigLoader;
use deltaflow_signals::SessionFilter;
use std::path::PathBuf;

/// Arguments for the session command.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Instant to check in RFC 3339 (defaults to now)
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,

    /// Config file path
    #[arg(short, long, default_value = "config/deltaflow.toml")]
    pub config: PathBuf,
}

/// Runs the session command.
///
/// # Errors
/// Returns an error if the configured session is invalid.
pub fn run_session(args: SessionArgs) -> Result<()> {
    let config = ConfigLoader::load(&args.config)?;
    let filter = SessionFilter::from_config(&config.session)?;
    let at = args.at.unwrap_or_else(Utc::now);

    println!("{}", describe(&filter, &at));
    Ok(())
}

/// One-line description of the session state at `at`.
#[must_use]
pub fn describe(filter: &SessionFilter, at: &DateTime<Utc>) -> String {
    let local = at.with_timezone(&filter.timezone());
    let state = if filter.is_admissible(at) { "OPEN" } else { "CLOSED" };
    format!(
        "{} ({}) session {}",
        local.format("%Y-%m-%d %H:%M"),
        filter.timezone(),
        state
    )
}
