//! Signal model emitted by the delta-flow engine.
//!
//! A [`Signal`] is produced once per bar. Aggregates over many signals are
//! summarized in a [`FlowReport`], and rolling-window reversal checks produce a
//! [`DivergenceResult`].

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::market::CandleType;

/// Directional action recommended for a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    /// Returns true for BUY and SELL.
    #[must_use]
    pub const fn is_directional(self) -> bool {
        !matches!(self, Self::Hold)
    }

    /// Side used to orient stop and target levels.
    ///
    /// HOLD has no trading meaning; its levels use the short orientation.
    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Self::Buy => Side::Long,
            Self::Sell | Self::Hold => Side::Short,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// Orientation of risk levels around the entry price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Stop below, target above
    Long,
    /// Stop above, target below
    Short,
}

/// Stop-loss and profit-target prices for a trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevels {
    pub stop_loss: f64,
    pub profit_target: f64,
}

impl RiskLevels {
    /// Distance between `entry` and the stop.
    #[must_use]
    pub fn stop_distance(&self, entry: f64) -> f64 {
        (entry - self.stop_loss).abs()
    }

    /// Reward-to-risk ratio measured from `entry`, or `None` if the stop sits on the entry.
    #[must_use]
    pub fn reward_to_risk(&self, entry: f64) -> Option<f64> {
        let risk = self.stop_distance(entry);
        if risk > 0.0 {
            Some((self.profit_target - entry).abs() / risk)
        } else {
            None
        }
    }
}

/// Engine output for one bar.
///
/// Fields are read-only: `reversal` is derived from `action` when the signal
/// is built and HOLD always carries zero confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    action: Action,
    symbol: String,
    confidence: f64,
    delta: f64,
    candle_type: CandleType,
    atr_stop_loss: f64,
    atr_profit_target: f64,
    reasoning: String,
    reversal: bool,
}

impl Signal {
    /// Builds a signal.
    ///
    /// Confidence is forced to zero for HOLD.
    ///
    /// # Errors
    /// Returns an error if the symbol is blank or a directional confidence is
    /// outside [0.0, 1.0].
    pub fn new(
        action: Action,
        symbol: impl Into<String>,
        confidence: f64,
        delta: f64,
        candle_type: CandleType,
        levels: RiskLevels,
        reasoning: impl Into<String>,
    ) -> EngineResult<Self> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(EngineError::EmptySymbol);
        }

        let confidence = if action.is_directional() {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(EngineError::ConfidenceOutOfRange(confidence));
            }
            confidence
        } else {
            0.0
        };

        Ok(Self {
            action,
            symbol,
            confidence,
            delta,
            candle_type,
            atr_stop_loss: levels.stop_loss,
            atr_profit_target: levels.profit_target,
            reasoning: reasoning.into(),
            reversal: action.is_directional(),
        })
    }

    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    #[must_use]
    pub const fn delta(&self) -> f64 {
        self.delta
    }

    #[must_use]
    pub const fn candle_type(&self) -> CandleType {
        self.candle_type
    }

    #[must_use]
    pub const fn atr_stop_loss(&self) -> f64 {
        self.atr_stop_loss
    }

    #[must_use]
    pub const fn atr_profit_target(&self) -> f64 {
        self.atr_profit_target
    }

    #[must_use]
    pub const fn levels(&self) -> RiskLevels {
        RiskLevels {
            stop_loss: self.atr_stop_loss,
            profit_target: self.atr_profit_target,
        }
    }

    #[must_use]
    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    /// True exactly when the action is BUY or SELL.
    #[must_use]
    pub const fn reversal(&self) -> bool {
        self.reversal
    }
}

/// Result of inspecting a rolling window for price/flow divergence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DivergenceResult {
    pub bullish_divergence: bool,
    pub bearish_divergence: bool,
    /// Magnitude in [0.0, 1.0]
    pub strength: f64,
}

impl DivergenceResult {
    /// Non-signaling result used during warm-up.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            bullish_divergence: false,
            bearish_divergence: false,
            strength: 0.0,
        }
    }

    /// Returns true if either divergence flag is set.
    #[must_use]
    pub const fn is_signaling(&self) -> bool {
        self.bullish_divergence || self.bearish_divergence
    }
}

/// Overall directional lean of a batch of signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketBias {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for MarketBias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Bullish => "BULLISH",
            Self::Bearish => "BEARISH",
            Self::Neutral => "NEUTRAL",
        };
        f.write_str(s)
    }
}

/// Summary statistics over a batch of signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowReport {
    /// Count of non-HOLD signals
    pub total_signals: usize,
    pub long_signals: usize,
    pub short_signals: usize,
    /// Mean confidence over non-HOLD signals, 0.0 if there are none
    pub average_confidence: f64,
    /// Highest-confidence signal in the batch
    pub strongest_signal: Option<Signal>,
    pub market_bias: MarketBias,
}

impl FlowReport {
    /// Report for an empty batch.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total_signals: 0,
            long_signals: 0,
            short_signals: 0,
            average_confidence: 0.0,
            strongest_signal: None,
            market_bias: MarketBias::Neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels() -> RiskLevels {
        RiskLevels {
            stop_loss: 100.5,
            profit_target: 104.0,
        }
    }

    #[test]
    fn action_side_orientation() {
        assert_eq!(Action::Buy.side(), Side::Long);
        assert_eq!(Action::Sell.side(), Side::Short);
        assert_eq!(Action::Hold.side(), Side::Short);
    }

    #[test]
    fn action_is_directional() {
        assert!(Action::Buy.is_directional());
        assert!(Action::Sell.is_directional());
        assert!(!Action::Hold.is_directional());
    }

    #[test]
    fn reversal_derived_from_action() {
        let buy = Signal::new(Action::Buy, "ES", 0.6, -200.0, CandleType::Green, levels(), "x")
            .unwrap();
        assert!(buy.reversal());

        let hold = Signal::new(Action::Hold, "ES", 0.0, 10.0, CandleType::Doji, levels(), "x")
            .unwrap();
        assert!(!hold.reversal());
    }

    #[test]
    fn hold_confidence_forced_to_zero() {
        let hold = Signal::new(Action::Hold, "ES", 0.7, 10.0, CandleType::Green, levels(), "x")
            .unwrap();
        assert_eq!(hold.confidence(), 0.0);
    }

    #[test]
    fn rejects_empty_symbol() {
        let err = Signal::new(Action::Buy, "  ", 0.5, -200.0, CandleType::Green, levels(), "x")
            .unwrap_err();
        assert_eq!(err, EngineError::EmptySymbol);
    }

    #[test]
    fn rejects_confidence_out_of_range() {
        let err = Signal::new(Action::Sell, "NQ", 1.2, 200.0, CandleType::Red, levels(), "x")
            .unwrap_err();
        assert_eq!(err, EngineError::ConfidenceOutOfRange(1.2));
    }

    #[test]
    fn risk_levels_reward_to_risk() {
        let l = levels();
        assert!((l.stop_distance(102.0) - 1.5).abs() < 1e-12);
        let rr = l.reward_to_risk(102.0).unwrap();
        assert!((rr - 2.0 / 1.5).abs() < 1e-12);

        let flat = RiskLevels {
            stop_loss: 102.0,
            profit_target: 102.0,
        };
        assert!(flat.reward_to_risk(102.0).is_none());
    }

    #[test]
    fn signal_serializes_with_reversal() {
        let buy = Signal::new(Action::Buy, "ES", 0.6, -200.0, CandleType::Green, levels(), "x")
            .unwrap();
        let json = serde_json::to_value(&buy).unwrap();
        assert_eq!(json["action"], "BUY");
        assert_eq!(json["candle_type"], "GREEN");
        assert_eq!(json["reversal"], true);
    }

    #[test]
    fn empty_report_is_neutral() {
        let report = FlowReport::empty();
        assert_eq!(report.total_signals, 0);
        assert_eq!(report.market_bias, MarketBias::Neutral);
        assert!(report.strongest_signal.is_none());
    }

    #[test]
    fn neutral_divergence_is_not_signaling() {
        assert!(!DivergenceResult::neutral().is_signaling());
        assert_eq!(DivergenceResult::default(), DivergenceResult::neutral());
    }
}
