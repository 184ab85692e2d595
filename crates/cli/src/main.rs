use clap::{Parser, Subcommand};

use deltaflow_cli::commands::{self, ConfigArgs, ReplayArgs, SessionArgs, SignalArgs};

#[derive(Parser)]
#[command(name = "deltaflow")]
#[command(about = "Order-flow delta absorption signals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a historical bar CSV through the engine
    Replay(ReplayArgs),
    /// Evaluate a single bar
    Signal(SignalArgs),
    /// Check whether an instant falls inside the trading session
    Session(SessionArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Replay(args) => {
            commands::run_replay(args).await?;
        }
        Commands::Signal(args) => {
            commands::run_signal(args)?;
        }
        Commands::Session(args) => {
            commands::run_session(args)?;
        }
        Commands::Config(args) => {
            commands::run_config(args)?;
        }
    }

    Ok(())
}
