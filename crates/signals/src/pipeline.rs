//! Symbol-sharded bar processing.
//!
//! Bars are pulled from a [`BarSource`] and routed by symbol to one tokio task
//! per symbol over a bounded channel, so each symbol is processed strictly in
//! arrival order while different symbols run in parallel. Every worker owns its
//! own ATR and bar history; the shared [`DeltaFlowEngine`] holds configuration only.
//!
//! ```text
//! BarSource ──► router ──┬─► [ES worker]  ATR ─► signal ─► divergence ─► session ─► size
//!                        ├─► [NQ worker]  ...
//!                        └─► [CL worker]  ...
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use deltaflow_core::{
    BarEvent, BarSource, DivergenceResult, EngineConfig, EngineResult, FlowReport, PipelineConfig,
    Signal,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::DeltaFlowEngine;
use crate::history::BarHistory;
use crate::report::ReportAggregator;
use crate::volatility::AverageTrueRange;

/// Everything the engine concluded about one bar.
#[derive(Debug, Clone, Serialize)]
pub struct FlowEvaluation {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    /// ATR used for stop/target placement
    pub volatility: f64,
    pub signal: Signal,
    pub divergence: DivergenceResult,
    /// Whether the bar closed inside the trading session
    pub in_session: bool,
    /// Suggested size for BUY/SELL, `None` for HOLD
    pub position_size: Option<f64>,
}

/// Per-symbol state: volatility estimate and recent bars.
pub struct SymbolWorker {
    symbol: String,
    engine: Arc<DeltaFlowEngine>,
    atr: AverageTrueRange,
    history: BarHistory,
    balance: f64,
}

impl SymbolWorker {
    #[must_use]
    pub fn new(symbol: impl Into<String>, engine: Arc<DeltaFlowEngine>, settings: &PipelineConfig) -> Self {
        let window = engine.detector().required_bars();
        Self {
            symbol: symbol.into(),
            atr: AverageTrueRange::new(settings.atr_period),
            history: BarHistory::new(window),
            balance: settings.account_balance,
            engine,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Processes the next bar for this symbol.
    ///
    /// Returns `None` while the ATR warms up and for bars the engine rejects.
    pub fn process(&mut self, bar: &BarEvent) -> Option<FlowEvaluation> {
        if let Err(e) = bar.order_flow.validate() {
            warn!(symbol = %self.symbol, timestamp = %bar.timestamp(), error = %e, "bar rejected");
            return None;
        }

        let volatility = self.atr.update(&bar.candle);
        self.history.push(bar.candle, bar.order_flow.delta);

        let Some(volatility) = volatility else {
            debug!(symbol = %self.symbol, period = self.atr.period(), "ATR warming up");
            return None;
        };

        let signal = match self.engine.generate_signal(
            &self.symbol,
            &bar.candle,
            &bar.order_flow,
            volatility,
        ) {
            Ok(signal) => signal,
            Err(e) => {
                warn!(symbol = %self.symbol, timestamp = %bar.timestamp(), error = %e, "signal rejected");
                return None;
            }
        };

        let divergence = self
            .engine
            .detect_divergence(&self.history.candles(), &self.history.deltas());
        let in_session = self.engine.session().is_admissible(&bar.timestamp());

        let position_size = match self
            .engine
            .risk()
            .size_for_signal(self.balance, &signal, bar.candle.close())
        {
            Ok(size) => size,
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "position sizing failed");
                None
            }
        };

        Some(FlowEvaluation {
            symbol: self.symbol.clone(),
            timestamp: bar.timestamp(),
            close: bar.candle.close(),
            volatility,
            signal,
            divergence,
            in_session,
            position_size,
        })
    }
}

/// Evaluations grouped by symbol, each in arrival order.
#[derive(Debug, Default)]
pub struct PipelineOutput {
    evaluations: BTreeMap<String, Vec<FlowEvaluation>>,
}

impl PipelineOutput {
    #[must_use]
    pub fn symbols(&self) -> Vec<&str> {
        self.evaluations.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn evaluations(&self, symbol: &str) -> &[FlowEvaluation] {
        self.evaluations.get(symbol).map_or(&[], Vec::as_slice)
    }

    /// All evaluations, symbol by symbol.
    pub fn iter(&self) -> impl Iterator<Item = &FlowEvaluation> {
        self.evaluations.values().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.evaluations.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Report for one symbol, optionally restricted to in-session bars.
    #[must_use]
    pub fn report(&self, aggregator: &ReportAggregator, symbol: &str, session_only: bool) -> FlowReport {
        aggregator.aggregate(
            self.evaluations(symbol)
                .iter()
                .filter(|e| !session_only || e.in_session)
                .map(|e| &e.signal),
        )
    }

    /// Report across every symbol.
    #[must_use]
    pub fn overall_report(&self, aggregator: &ReportAggregator, session_only: bool) -> FlowReport {
        aggregator.aggregate(
            self.iter()
                .filter(|e| !session_only || e.in_session)
                .map(|e| &e.signal),
        )
    }
}

type WorkerHandle = (mpsc::Sender<BarEvent>, JoinHandle<Vec<FlowEvaluation>>);

pub struct FlowPipeline {
    engine: Arc<DeltaFlowEngine>,
    settings: PipelineConfig,
}

impl FlowPipeline {
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        Ok(Self {
            engine: Arc::new(DeltaFlowEngine::new(config)?),
            settings: config.pipeline.clone(),
        })
    }

    #[must_use]
    pub fn engine(&self) -> &DeltaFlowEngine {
        &self.engine
    }

    /// Drains `source`, fanning bars out to per-symbol workers.
    ///
    /// # Errors
    /// Returns an error if the source fails or a worker task panics.
    pub async fn run<S: BarSource>(&self, mut source: S) -> Result<PipelineOutput> {
        let mut workers: HashMap<String, WorkerHandle> = HashMap::new();
        let mut routed = 0usize;

        while let Some(bar) = source.next_bar().await? {
            let (tx, _) = workers
                .entry(bar.symbol.clone())
                .or_insert_with(|| self.spawn_worker(&bar.symbol));
            tx.send(bar)
                .await
                .context("flow worker stopped before the source was drained")?;
            routed += 1;
        }

        info!(bars = routed, symbols = workers.len(), "source drained");

        let mut output = PipelineOutput::default();
        for (symbol, (tx, handle)) in workers {
            drop(tx);
            let evaluations = handle
                .await
                .with_context(|| format!("flow worker for {symbol} failed"))?;
            output.evaluations.insert(symbol, evaluations);
        }

        Ok(output)
    }

    fn spawn_worker(&self, symbol: &str) -> WorkerHandle {
        let (tx, mut rx) = mpsc::channel::<BarEvent>(self.settings.channel_capacity);
        let mut worker = SymbolWorker::new(symbol, Arc::clone(&self.engine), &self.settings);

        let handle = tokio::spawn(async move {
            info!(symbol = %worker.symbol(), "flow worker started");
            let mut evaluations = Vec::new();
            while let Some(bar) = rx.recv().await {
                if let Some(evaluation) = worker.process(&bar) {
                    evaluations.push(evaluation);
                }
            }
            info!(
                symbol = %worker.symbol(),
                evaluations = evaluations.len(),
                "flow worker finished"
            );
            evaluations
        });

        (tx, handle)
    }
}
