//! Replay command.
//!
//! Streams a historical bar CSV through the per-symbol pipeline and prints
//! every directional signal followed by per-symbol and overall flow reports.

use anyhow::Result;
use clap::Args;
use deltaflow_core::{Action, ConfigLoader, EngineConfig, FlowReport, ReportFormatter};
use deltaflow_signals::{FlowEvaluation, FlowPipeline, PipelineOutput};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::csv_source::CsvBarSource;

/// Arguments for the replay command.
#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Historical bar CSV file
    #[arg(short, long)]
    pub data: PathBuf,

    /// Config file path
    #[arg(short, long, default_value = "config/deltaflow.toml")]
    pub config: PathBuf,

    /// Account balance for position sizing (overrides config)
    #[arg(long)]
    pub balance: Option<f64>,

    /// Instrument tick size (overrides config)
    #[arg(long)]
    pub tick_size: Option<f64>,

    /// Only report bars that closed inside the trading session
    #[arg(long)]
    pub session_only: bool,

    /// Print JSON instead of formatted text
    #[arg(long)]
    pub json: bool,
}

/// Result of a replay, ready for rendering.
#[derive(Debug, Serialize)]
pub struct ReplayOutcome {
    pub evaluations: Vec<FlowEvaluation>,
    pub reports: Vec<SymbolReport>,
    pub overall: FlowReport,
}

#[derive(Debug, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub report: FlowReport,
}

/// Runs the replay command.
///
/// # Errors
/// Returns an error if the configuration or CSV file is invalid.
pub async fn run_replay(args: ReplayArgs) -> Result<()> {
    let config = ConfigLoader::load(&args.config)?;
    let outcome = replay(&args, config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render_text(&outcome));
    }

    Ok(())
}

/// Replays `args.data` with `config`, applying command-line overrides.
///
/// # Errors
/// Returns an error if the overrides are invalid or the CSV cannot be read.
pub async fn replay(args: &ReplayArgs, mut config: EngineConfig) -> Result<ReplayOutcome> {
    if let Some(balance) = args.balance {
        config.pipeline.account_balance = balance;
    }
    if let Some(tick_size) = args.tick_size {
        config.pipeline.tick_size = tick_size;
    }

    let pipeline = FlowPipeline::new(&config)?;
    let source = CsvBarSource::from_csv(&args.data, config.pipeline.tick_size)?;

    tracing::info!(
        data = %args.data.display(),
        bars = source.len(),
        session_only = args.session_only,
        "replaying bars"
    );

    let output = pipeline.run(source).await?;
    Ok(summarize(&pipeline, &output, args.session_only))
}

fn summarize(pipeline: &FlowPipeline, output: &PipelineOutput, session_only: bool) -> ReplayOutcome {
    let aggregator = pipeline.engine().aggregator();

    let evaluations = output
        .iter()
        .filter(|e| !session_only || e.in_session)
        .cloned()
        .collect();

    let reports = output
        .symbols()
        .into_iter()
        .map(|symbol| SymbolReport {
            symbol: symbol.to_string(),
            report: output.report(aggregator, symbol, session_only),
        })
        .collect();

    ReplayOutcome {
        evaluations,
        reports,
        overall: output.overall_report(aggregator, session_only),
    }
}

/// Formats directional signals and reports for the terminal.
#[must_use]
pub fn render_text(outcome: &ReplayOutcome) -> String {
    let mut out = String::new();

    let directional: Vec<&FlowEvaluation> = outcome
        .evaluations
        .iter()
        .filter(|e| e.signal.action() != Action::Hold)
        .collect();

    let _ = writeln!(out, "\nSignals ({} of {} bars)", directional.len(), outcome.evaluations.len());
    out.push_str("───────────────────────────────────────────────────────────────\n");
    for e in &directional {
        let size = e
            .position_size
            .map_or_else(|| "-".to_string(), |s| format!("{s:.2}"));
        let _ = writeln!(
            out,
            "{} {:<6} {:<4} close {:>10.2}  conf {:>5.1}%  stop {:>10.2}  target {:>10.2}  size {:>8}{}{}",
            e.timestamp.format("%Y-%m-%d %H:%M"),
            e.symbol,
            e.signal.action().to_string(),
            e.close,
            e.signal.confidence() * 100.0,
            e.signal.atr_stop_loss(),
            e.signal.atr_profit_target(),
            size,
            divergence_tag(e),
            if e.in_session { "" } else { "  [off-session]" },
        );
    }

    for symbol_report in &outcome.reports {
        out.push_str(&ReportFormatter::format(&symbol_report.symbol, &symbol_report.report));
    }
    if outcome.reports.len() > 1 {
        out.push_str(&ReportFormatter::format("ALL SYMBOLS", &outcome.overall));
    }

    out
}

fn divergence_tag(e: &FlowEvaluation) -> String {
    let d = &e.divergence;
    if d.bullish_divergence {
        format!("  bullish divergence {:.2}", d.strength)
    } else if d.bearish_divergence {
        format!("  bearish divergence {:.2}", d.strength)
    } else {
        String::new()
    }
}
