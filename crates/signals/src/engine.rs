//! Configured bundle of every delta-flow component.
//!
//! Holds only configuration, so one instance can be shared across symbols
//! and threads. All per-symbol state (ATR, bar history) lives with the caller.

use deltaflow_core::{
    Candle, DivergenceResult, EngineConfig, EngineResult, FlowReport, OrderFlowSnapshot, Signal,
};

use crate::divergence::DivergenceDetector;
use crate::generator::DeltaFlowGenerator;
use crate::report::ReportAggregator;
use crate::risk::RiskEngine;
use crate::session::SessionFilter;

#[derive(Debug, Clone)]
pub struct DeltaFlowEngine {
    generator: DeltaFlowGenerator,
    detector: DivergenceDetector,
    session: SessionFilter,
    aggregator: ReportAggregator,
}

impl DeltaFlowEngine {
    /// Builds an engine from a validated configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            generator: DeltaFlowGenerator::from_config(config),
            detector: DivergenceDetector::new(config.divergence.clone()),
            session: SessionFilter::from_config(&config.session)?,
            aggregator: ReportAggregator::new(config.report.clone()),
        })
    }

    /// # Errors
    /// See [`DeltaFlowGenerator::generate_signal`].
    pub fn generate_signal(
        &self,
        symbol: &str,
        candle: &Candle,
        order_flow: &OrderFlowSnapshot,
        volatility: f64,
    ) -> EngineResult<Signal> {
        self.generator
            .generate_signal(symbol, candle, order_flow, volatility)
    }

    #[must_use]
    pub fn detect_divergence(&self, candles: &[Candle], deltas: &[f64]) -> DivergenceResult {
        self.detector.detect(candles, deltas)
    }

    #[must_use]
    pub fn aggregate(&self, signals: &[Signal]) -> FlowReport {
        self.aggregator.aggregate(signals)
    }

    #[must_use]
    pub const fn generator(&self) -> &DeltaFlowGenerator {
        &self.generator
    }

    #[must_use]
    pub const fn risk(&self) -> &RiskEngine {
        self.generator.risk()
    }

    #[must_use]
    pub const fn detector(&self) -> &DivergenceDetector {
        &self.detector
    }

    #[must_use]
    pub const fn session(&self) -> &SessionFilter {
        &self.session
    }

    #[must_use]
    pub const fn aggregator(&self) -> &ReportAggregator {
        &self.aggregator
    }
}
