//! Prints the effective configuration after merging file and environment.

use anyhow::Result;
use clap::Args;
use deltaflow_core::ConfigLoader;
use std::path::PathBuf;

/// Arguments for the config command.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/deltaflow.toml")]
    pub config: PathBuf,
}

/// Runs the config command.
///
/// # Errors
/// Returns an error if the configuration cannot be loaded or is invalid.
pub fn run_config(args: ConfigArgs) -> Result<()> {
    let config = ConfigLoader::load(&args.config)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
