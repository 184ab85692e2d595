//! Batch aggregation of signals into a [`FlowReport`].

use deltaflow_core::{Action, FlowReport, MarketBias, ReportConfig, Signal};

#[derive(Debug, Clone, Default)]
pub struct ReportAggregator {
    config: ReportConfig,
}

impl ReportAggregator {
    #[must_use]
    pub const fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Classifies the lean of a batch: one side must outnumber the other by
    /// more than `bias_ratio`.
    #[must_use]
    pub fn classify_bias(&self, long_signals: usize, short_signals: usize) -> MarketBias {
        let longs = long_signals as f64;
        let shorts = short_signals as f64;
        if longs > shorts * self.config.bias_ratio {
            MarketBias::Bullish
        } else if shorts > longs * self.config.bias_ratio {
            MarketBias::Bearish
        } else {
            MarketBias::Neutral
        }
    }

    /// Reduces a batch of signals.
    ///
    /// HOLD signals are excluded from the counts and the average. The
    /// strongest signal is the first one with the highest confidence.
    #[must_use]
    pub fn aggregate<'a, I>(&self, signals: I) -> FlowReport
    where
        I: IntoIterator<Item = &'a Signal>,
    {
        let mut long_signals = 0usize;
        let mut short_signals = 0usize;
        let mut confidence_sum = 0.0;
        let mut strongest: Option<&Signal> = None;

        for signal in signals {
            match signal.action() {
                Action::Buy => long_signals += 1,
                Action::Sell => short_signals += 1,
                Action::Hold => {}
            }
            if signal.action().is_directional() {
                confidence_sum += signal.confidence();
            }
            if strongest.map_or(true, |s| signal.confidence() > s.confidence()) {
                strongest = Some(signal);
            }
        }

        let total_signals = long_signals + short_signals;
        let average_confidence = if total_signals > 0 {
            confidence_sum / total_signals as f64
        } else {
            0.0
        };

        FlowReport {
            total_signals,
            long_signals,
            short_signals,
            average_confidence,
            strongest_signal: strongest.cloned(),
            market_bias: self.classify_bias(long_signals, short_signals),
        }
    }
}

/// Aggregates with the default bias ratio.
#[must_use]
pub fn aggregate(signals: &[Signal]) -> FlowReport {
    ReportAggregator::default().aggregate(signals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deltaflow_core::{CandleType, RiskLevels};

    fn signal(action: Action, confidence: f64) -> Signal {
        let candle_type = match action {
            Action::Buy => CandleType::Green,
            Action::Sell => CandleType::Red,
            Action::Hold => CandleType::Doji,
        };
        Signal::new(
            action,
            "ES",
            confidence,
            0.0,
            candle_type,
            RiskLevels {
                stop_loss: 99.0,
                profit_target: 102.0,
            },
            "test",
        )
        .unwrap()
    }

    #[test]
    fn empty_batch() {
        let report = aggregate(&[]);
        assert_eq!(report, FlowReport::empty());
    }

    #[test]
    fn two_longs_one_short_leans_bullish() {
        let batch = [
            signal(Action::Buy, 0.6),
            signal(Action::Buy, 0.7),
            signal(Action::Sell, 0.5),
        ];
        let report = aggregate(&batch);
        assert_eq!(report.long_signals, 2);
        assert_eq!(report.short_signals, 1);
        assert_eq!(report.total_signals, 3);
        assert!((report.average_confidence - 0.6).abs() < 1e-12);
        // 2 > 1.5 * 1
        assert_eq!(report.market_bias, MarketBias::Bullish);
        assert_eq!(report.strongest_signal.unwrap().confidence(), 0.7);
    }

    #[test]
    fn holds_are_excluded_from_counts_and_average() {
        let batch = [
            signal(Action::Hold, 0.0),
            signal(Action::Buy, 0.8),
            signal(Action::Hold, 0.0),
            signal(Action::Buy, 0.4),
        ];
        let report = aggregate(&batch);
        assert_eq!(report.total_signals, 2);
        assert!((report.average_confidence - 0.6).abs() < 1e-12);
        assert_eq!(report.market_bias, MarketBias::Bullish);
    }

    #[test]
    fn only_holds_yields_zero_average() {
        let batch = [signal(Action::Hold, 0.0), signal(Action::Hold, 0.0)];
        let report = aggregate(&batch);
        assert_eq!(report.total_signals, 0);
        assert_eq!(report.average_confidence, 0.0);
        assert_eq!(report.market_bias, MarketBias::Neutral);
        assert_eq!(report.strongest_signal.unwrap().action(), Action::Hold);
    }

    #[test]
    fn bias_thresholds() {
        let aggregator = ReportAggregator::default();
        assert_eq!(aggregator.classify_bias(0, 0), MarketBias::Neutral);
        assert_eq!(aggregator.classify_bias(1, 0), MarketBias::Bullish);
        assert_eq!(aggregator.classify_bias(0, 1), MarketBias::Bearish);
        assert_eq!(aggregator.classify_bias(3, 2), MarketBias::Neutral);
        assert_eq!(aggregator.classify_bias(2, 1), MarketBias::Bullish);
        assert_eq!(aggregator.classify_bias(4, 2), MarketBias::Bullish);
        assert_eq!(aggregator.classify_bias(2, 4), MarketBias::Bearish);
    }

    #[test]
    fn strongest_prefers_first_on_ties() {
        let batch = [signal(Action::Sell, 0.6), signal(Action::Buy, 0.6)];
        let report = aggregate(&batch);
        assert_eq!(report.strongest_signal.unwrap().action(), Action::Sell);
    }

    #[test]
    fn custom_bias_ratio() {
        let aggregator = ReportAggregator::new(ReportConfig { bias_ratio: 1.0 });
        assert_eq!(aggregator.classify_bias(3, 2), MarketBias::Bullish);
    }
}
