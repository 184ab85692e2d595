//! Volatility-scaled risk levels and confidence-weighted position sizing.

use deltaflow_core::{ensure_finite, EngineError, EngineResult, RiskConfig, RiskLevels, Side, Signal};

#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    config: RiskConfig,
}

impl RiskEngine {
    #[must_use]
    pub const fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Places the stop and target `stop_multiple` / `target_multiple` volatility
    /// units away from `close_price`.
    ///
    /// # Errors
    /// Returns an error if `close_price` is not finite or `volatility` is not positive.
    pub fn risk_levels(&self, side: Side, close_price: f64, volatility: f64) -> EngineResult<RiskLevels> {
        ensure_finite("close price", close_price)?;
        if !(volatility.is_finite() && volatility > 0.0) {
            return Err(EngineError::NonPositiveVolatility(volatility));
        }

        let stop_offset = volatility * self.config.stop_multiple;
        let target_offset = volatility * self.config.target_multiple;

        Ok(match side {
            Side::Long => RiskLevels {
                stop_loss: close_price - stop_offset,
                profit_target: close_price + target_offset,
            },
            Side::Short => RiskLevels {
                stop_loss: close_price + stop_offset,
                profit_target: close_price - target_offset,
            },
        })
    }

    /// Sizes a trade so that hitting the stop loses `max_risk_fraction` of the
    /// balance, scaled by `0.5 + confidence`.
    ///
    /// # Errors
    /// Returns an error if `balance <= 0`, `confidence` is outside [0, 1] or
    /// `stop_distance <= 0`.
    pub fn position_size(&self, balance: f64, confidence: f64, stop_distance: f64) -> EngineResult<f64> {
        if !(balance.is_finite() && balance > 0.0) {
            return Err(EngineError::NonPositiveBalance(balance));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(EngineError::ConfidenceOutOfRange(confidence));
        }
        if !(stop_distance.is_finite() && stop_distance > 0.0) {
            return Err(EngineError::NonPositiveStopDistance(stop_distance));
        }

        let risk_amount = balance * self.config.max_risk_fraction;
        let base_size = risk_amount / stop_distance;
        let confidence_multiplier = 0.5 + confidence;

        Ok(base_size * confidence_multiplier)
    }

    /// Sizes a signal entered at `entry_price`. HOLD signals are not sized.
    ///
    /// # Errors
    /// Propagates [`RiskEngine::position_size`] errors.
    pub fn size_for_signal(&self, balance: f64, signal: &Signal, entry_price: f64) -> EngineResult<Option<f64>> {
        if !signal.action().is_directional() {
            return Ok(None);
        }
        let stop_distance = signal.levels().stop_distance(entry_price);
        self.position_size(balance, signal.confidence(), stop_distance)
            .map(Some)
    }
}
