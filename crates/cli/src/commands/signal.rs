//! One-shot signal evaluation for a single bar given on the command line.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use deltaflow_core::{Candle, ConfigLoader, EngineConfig, OrderFlowSnapshot, Signal};
use deltaflow_signals::DeltaFlowEngine;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the signal command.
#[derive(Args, Debug, Clone)]
pub struct SignalArgs {
    /// Instrument symbol (e.g., "ES")
    #[arg(long)]
    pub symbol: String,

    #[arg(long)]
    pub open: f64,

    #[arg(long)]
    pub high: f64,

    #[arg(long)]
    pub low: f64,

    #[arg(long)]
    pub close: f64,

    /// Bar volume
    #[arg(long, default_value_t = 0.0)]
    pub volume: f64,

    /// Net aggressive delta for the bar (ask volume minus bid volume)
    #[arg(long, allow_hyphen_values = true)]
    pub delta: f64,

    /// Volatility measure for the bar, typically ATR(14)
    #[arg(long)]
    pub volatility: f64,

    /// Instrument tick size (overrides config)
    #[arg(long)]
    pub tick_size: Option<f64>,

    /// Account balance for position sizing (overrides config)
    #[arg(long)]
    pub balance: Option<f64>,

    /// Bar close time in RFC 3339 (defaults to now)
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,

    /// Config file path
    #[arg(short, long, default_value = "config/deltaflow.toml")]
    pub config: PathBuf,

    /// Print JSON instead of formatted text
    #[arg(long)]
    pub json: bool,
}

/// Signal plus the context a trader needs to act on it.
#[derive(Debug, Serialize)]
pub struct SignalOutcome {
    pub signal: Signal,
    pub in_session: bool,
    pub position_size: Option<f64>,
}

/// Runs the signal command.
///
/// # Errors
/// Returns an error if the configuration or bar is invalid.
pub fn run_signal(args: SignalArgs) -> Result<()> {
    let config = ConfigLoader::load(&args.config)?;
    let outcome = evaluate(&args, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let signal = &outcome.signal;
    println!("{} {}", signal.action(), signal.symbol());
    println!("  Confidence:  {:.2}%", signal.confidence() * 100.0);
    println!("  Delta:       {:+.0} on {} candle", signal.delta(), signal.candle_type());
    println!("  Stop:        {:.4}", signal.atr_stop_loss());
    println!("  Target:      {:.4}", signal.atr_profit_target());
    if let Some(size) = outcome.position_size {
        println!("  Size:        {size:.4}");
    }
    println!(
        "  Session:     {}",
        if outcome.in_session { "open" } else { "closed (do not act)" }
    );
    println!("  {}", signal.reasoning());

    Ok(())
}

/// Evaluates the bar described by `args`.
///
/// # Errors
/// Returns an error if the candle is malformed, the volatility is not
/// positive or the overrides make the configuration invalid.
pub fn evaluate(args: &SignalArgs, mut config: EngineConfig) -> Result<SignalOutcome> {
    if let Some(tick_size) = args.tick_size {
        config.pipeline.tick_size = tick_size;
    }
    if let Some(balance) = args.balance {
        config.pipeline.account_balance = balance;
    }

    let engine = DeltaFlowEngine::new(&config)?;
    let candle = Candle::new(
        args.open,
        args.high,
        args.low,
        args.close,
        args.volume,
        config.pipeline.tick_size,
    )?;
    let at = args.at.unwrap_or_else(Utc::now);
    let order_flow = OrderFlowSnapshot::new(args.delta, args.volume, 0.0, 0.0, args.close, at);

    let signal = engine.generate_signal(&args.symbol, &candle, &order_flow, args.volatility)?;
    let position_size =
        engine
            .risk()
            .size_for_signal(config.pipeline.account_balance, &signal, args.close)?;

    tracing::debug!(symbol = %args.symbol, action = %signal.action(), "bar evaluated");

    Ok(SignalOutcome {
        in_session: engine.session().is_admissible(&at),
        position_size,
        signal,
    })
}
