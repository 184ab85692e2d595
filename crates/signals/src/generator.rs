//! Delta absorption signal generator.
//!
//! Compares a bar's candle color against the sign of its order-flow delta.
//! When price closes higher on net aggressive selling, passive buyers absorbed
//! the selling (BUY). When price closes lower on net aggressive buying,
//! passive sellers absorbed the buying (SELL). Everything else is HOLD.
//!
//! ```text
//!   candle   delta    |delta| >= threshold   body >= floor   action
//!   GREEN    < 0      yes                    yes             BUY
//!   RED      > 0      yes                    yes             SELL
//!   *        *        otherwise                              HOLD
//! ```

use deltaflow_core::{
    ensure_finite, Action, Candle, EngineConfig, EngineError, EngineResult, OrderFlowSnapshot,
    Signal, SignalConfig,
};
use tracing::debug;

use crate::confidence::ConfidenceScorer;
use crate::risk::RiskEngine;

/// Green candle closed on net aggressive selling of sufficient size.
#[must_use]
pub fn long_condition(candle: &Candle, delta: f64, config: &SignalConfig) -> bool {
    candle.is_green()
        && delta < 0.0
        && delta.abs() >= config.delta_threshold
        && candle.body_size() >= config.min_body_ticks
}

/// Red candle closed on net aggressive buying of sufficient size.
#[must_use]
pub fn short_condition(candle: &Candle, delta: f64, config: &SignalConfig) -> bool {
    candle.is_red()
        && delta > 0.0
        && delta.abs() >= config.delta_threshold
        && candle.body_size() >= config.min_body_ticks
}

#[derive(Debug, Clone, Default)]
pub struct DeltaFlowGenerator {
    config: SignalConfig,
    scorer: ConfidenceScorer,
    risk: RiskEngine,
}

impl DeltaFlowGenerator {
    #[must_use]
    pub const fn new(config: SignalConfig, scorer: ConfidenceScorer, risk: RiskEngine) -> Self {
        Self {
            config,
            scorer,
            risk,
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.signal.clone(),
            ConfidenceScorer::new(config.confidence.clone()),
            RiskEngine::new(config.risk.clone()),
        )
    }

    #[must_use]
    pub const fn config(&self) -> &SignalConfig {
        &self.config
    }

    #[must_use]
    pub const fn risk(&self) -> &RiskEngine {
        &self.risk
    }

    /// Produces the signal for one bar.
    ///
    /// Stop and target are computed relative to the candle close for every
    /// action, HOLD included.
    ///
    /// # Errors
    /// Returns an error if the symbol is blank, the volatility is not
    /// positive, or the order-flow snapshot carries non-finite values.
    pub fn generate_signal(
        &self,
        symbol: &str,
        candle: &Candle,
        order_flow: &OrderFlowSnapshot,
        volatility: f64,
    ) -> EngineResult<Signal> {
        if symbol.trim().is_empty() {
            return Err(EngineError::EmptySymbol);
        }
        if !(volatility.is_finite() && volatility > 0.0) {
            return Err(EngineError::NonPositiveVolatility(volatility));
        }
        let delta = ensure_finite("delta", order_flow.delta)?;
        let abs_delta = delta.abs();
        let candle_type = candle.candle_type();

        let action = if long_condition(candle, delta, &self.config) {
            Action::Buy
        } else if short_condition(candle, delta, &self.config) {
            Action::Sell
        } else {
            Action::Hold
        };

        let levels = self
            .risk
            .risk_levels(action.side(), candle.close(), volatility)?;

        let (confidence, reasoning) = match action {
            Action::Buy => (
                self.scorer.score(abs_delta, candle.body_size(), volatility)?,
                format!(
                    "Bullish absorption: {abs_delta:.0} net aggressive selling absorbed while price \
                     closed {:.1} ticks higher; sellers exhausted, expecting reversal up",
                    candle.body_size()
                ),
            ),
            Action::Sell => (
                self.scorer.score(abs_delta, candle.body_size(), volatility)?,
                format!(
                    "Bearish absorption: {abs_delta:.0} net aggressive buying absorbed while price \
                     closed {:.1} ticks lower; buyers exhausted, expecting reversal down",
                    candle.body_size()
                ),
            ),
            Action::Hold => (
                0.0,
                format!("No absorption: delta {delta:+.0} on {candle_type} candle"),
            ),
        };

        debug!(
            symbol,
            action = %action,
            delta,
            body_ticks = candle.body_size(),
            confidence,
            volatility,
            "delta-flow signal"
        );

        Signal::new(
            action,
            symbol,
            confidence,
            delta,
            candle_type,
            levels,
            reasoning,
        )
    }
}
