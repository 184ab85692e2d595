//! Price vs. order-flow divergence detection.
//!
//! Inspects the most recent `window` bars (5 by default):
//! - Price trend samples the first, middle and last bar of the window.
//!   Higher highs: `high[last] > high[mid] > high[first]`.
//!   Lower lows:   `low[last] < low[mid] < low[first]`.
//! - Flow trend compares the sum of the two oldest deltas with the sum of the
//!   two most recent ones. Weakening: `recent < oldest * weakening_ratio`.
//!   Strengthening: `recent > oldest * strengthening_ratio`.
//! - Bullish divergence: lower lows while flow strengthens.
//!   Bearish divergence: higher highs while flow weakens.
//!
//! Fewer bars than the window yields the neutral result. If a window would
//! raise both flags at once, neither is raised.

use deltaflow_core::{Candle, DivergenceConfig, DivergenceResult};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct DivergenceDetector {
    config: DivergenceConfig,
}

impl DivergenceDetector {
    #[must_use]
    pub const fn new(config: DivergenceConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &DivergenceConfig {
        &self.config
    }

    /// Number of bars required before the detector can signal.
    #[must_use]
    pub fn required_bars(&self) -> usize {
        self.config.window.max(5)
    }

    /// Detects divergence over the most recent bars.
    ///
    /// `candles` and `deltas` are in chronological order (oldest first) and
    /// are aligned from the most recent end.
    #[must_use]
    pub fn detect(&self, candles: &[Candle], deltas: &[f64]) -> DivergenceResult {
        let n = self.required_bars();
        if candles.len() < n || deltas.len() < n {
            return DivergenceResult::neutral();
        }

        let candles = &candles[candles.len() - n..];
        let deltas = &deltas[deltas.len() - n..];

        if deltas.iter().any(|d| !d.is_finite()) {
            return DivergenceResult::neutral();
        }

        let (first, mid, last) = (&candles[0], &candles[n / 2], &candles[n - 1]);
        let higher_highs = last.high() > mid.high() && mid.high() > first.high();
        let lower_lows = last.low() < mid.low() && mid.low() < first.low();

        let delta_sum = deltas[0] + deltas[1];
        let recent_delta_sum = deltas[n - 2] + deltas[n - 1];
        let weakening = recent_delta_sum < delta_sum * self.config.weakening_ratio;
        let strengthening = recent_delta_sum > delta_sum * self.config.strengthening_ratio;

        let mut bullish = lower_lows && strengthening;
        let mut bearish = higher_highs && weakening;
        if bullish && bearish {
            debug!(
                delta_sum,
                recent_delta_sum, "ambiguous divergence window, leaving both flags clear"
            );
            bullish = false;
            bearish = false;
        }

        let strength = (recent_delta_sum.abs() / self.config.strength_scale).min(1.0);

        if bullish || bearish {
            debug!(bullish, bearish, strength, delta_sum, recent_delta_sum, "divergence detected");
        }

        DivergenceResult {
            bullish_divergence: bullish,
            bearish_divergence: bearish,
            strength,
        }
    }
}

/// Detects divergence with the default window and ratios.
#[must_use]
pub fn detect_divergence(candles: &[Candle], deltas: &[f64]) -> DivergenceResult {
    DivergenceDetector::default().detect(candles, deltas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(high: f64, low: f64) -> Candle {
        let mid = (high + low) / 2.0;
        Candle::new(mid, high, low, mid, 100.0, 0.25).unwrap()
    }

    fn falling() -> Vec<Candle> {
        vec![
            candle(110.0, 100.0),
            candle(109.0, 99.0),
            candle(108.0, 98.0),
            candle(107.0, 97.0),
            candle(106.0, 96.0),
        ]
    }

    fn rising() -> Vec<Candle> {
        vec![
            candle(110.0, 100.0),
            candle(111.0, 101.0),
            candle(112.0, 102.0),
            candle(113.0, 103.0),
            candle(114.0, 104.0),
        ]
    }

    #[test]
    fn bullish_when_lower_lows_and_flow_strengthens() {
        let deltas = [50.0, 50.0, 0.0, 150.0, 150.0];
        let result = detect_divergence(&falling(), &deltas);
        assert!(result.bullish_divergence);
        assert!(!result.bearish_divergence);
        assert!((result.strength - 0.3).abs() < 1e-12);
    }

    #[test]
    fn bearish_when_higher_highs_and_flow_weakens() {
        let deltas = [300.0, 300.0, 100.0, 100.0, 100.0];
        let result = detect_divergence(&rising(), &deltas);
        assert!(result.bearish_divergence);
        assert!(!result.bullish_divergence);
        assert!((result.strength - 0.2).abs() < 1e-12);
    }

    #[test]
    fn aligned_flow_is_not_divergent() {
        // Falling price with weakening flow
        let deltas = [300.0, 300.0, 0.0, 100.0, 100.0];
        let result = detect_divergence(&falling(), &deltas);
        assert!(!result.is_signaling());
    }

    #[test]
    fn warm_up_is_neutral() {
        let candles = falling();
        for len in 0..5 {
            let deltas = vec![100.0; len];
            let result = detect_divergence(&candles[..len], &deltas);
            assert_eq!(result, DivergenceResult::neutral());
        }
    }

    #[test]
    fn short_deltas_are_neutral_even_with_enough_candles() {
        let result = detect_divergence(&falling(), &[50.0, 50.0, 150.0, 150.0]);
        assert_eq!(result, DivergenceResult::neutral());
    }

    #[test]
    fn uses_most_recent_window() {
        let mut candles = rising();
        candles.extend(falling());
        let mut deltas = vec![0.0; 5];
        deltas.extend([50.0, 50.0, 0.0, 150.0, 150.0]);
        let result = detect_divergence(&candles, &deltas);
        assert!(result.bullish_divergence);
    }

    #[test]
    fn expanding_range_with_negative_flow_raises_neither() {
        // Higher highs and lower lows at once; a negative oldest sum makes
        // -100 both "weakening" (< -50) and "strengthening" (> -150).
        let candles = vec![
            candle(110.0, 100.0),
            candle(110.5, 99.5),
            candle(111.0, 99.0),
            candle(111.5, 98.5),
            candle(112.0, 98.0),
        ];
        let deltas = [-50.0, -50.0, 0.0, -50.0, -50.0];
        let result = detect_divergence(&candles, &deltas);
        assert!(!result.bullish_divergence);
        assert!(!result.bearish_divergence);
        assert!((result.strength - 0.1).abs() < 1e-12);
    }

    #[test]
    fn flat_prices_never_diverge() {
        let candles = vec![candle(101.0, 99.0); 5];
        let deltas = [100.0, -100.0, 100.0, -400.0, 400.0];
        let result = detect_divergence(&candles, &deltas);
        assert!(!result.is_signaling());
    }

    #[test]
    fn strength_saturates_at_one() {
        let deltas = [500.0, 500.0, 0.0, 2000.0, 2000.0];
        let result = detect_divergence(&falling(), &deltas);
        assert!(result.bullish_divergence);
        assert_eq!(result.strength, 1.0);
    }

    #[test]
    fn non_finite_delta_is_neutral() {
        let deltas = [50.0, 50.0, f64::NAN, 150.0, 150.0];
        assert_eq!(detect_divergence(&falling(), &deltas), DivergenceResult::neutral());
    }

    #[test]
    fn longer_window_samples_first_middle_last() {
        let detector = DivergenceDetector::new(DivergenceConfig {
            window: 7,
            ..DivergenceConfig::default()
        });
        let candles: Vec<Candle> = (0..7)
            .map(|i| {
                let shift = f64::from(i);
                candle(110.0 - shift, 100.0 - shift)
            })
            .collect();
        let deltas = [50.0, 50.0, 0.0, 0.0, 0.0, 150.0, 150.0];
        assert!(detector.detect(&candles, &deltas).bullish_divergence);
        assert_eq!(detector.detect(&candles[..6], &deltas[..6]), DivergenceResult::neutral());
    }
}
