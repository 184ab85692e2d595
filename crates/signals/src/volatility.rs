//! Streaming Average True Range.
//!
//! True Range: `max(high - low, |high - prev_close|, |low - prev_close|)`,
//! with the first bar using `high - low` alone. The ATR is seeded with the
//! mean of the first `period` true ranges and then Wilder-smoothed:
//! `atr = (atr * (period - 1) + tr) / period`.

use deltaflow_core::Candle;

#[derive(Debug, Clone)]
pub struct AverageTrueRange {
    period: usize,
    prev_close: Option<f64>,
    seed_sum: f64,
    seen: usize,
    value: Option<f64>,
}

impl AverageTrueRange {
    /// Creates an ATR over `period` bars (minimum 1).
    #[must_use]
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
            prev_close: None,
            seed_sum: 0.0,
            seen: 0,
            value: None,
        }
    }

    #[must_use]
    pub const fn period(&self) -> usize {
        self.period
    }

    /// Current ATR, `None` until `period` bars have been seen.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        self.value
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.value.is_some()
    }

    /// Feeds one bar and returns the updated ATR.
    pub fn update(&mut self, candle: &Candle) -> Option<f64> {
        let tr = true_range(candle, self.prev_close);
        self.prev_close = Some(candle.close());
        self.seen += 1;

        let n = self.period as f64;
        self.value = match self.value {
            Some(prev) => Some((prev * (n - 1.0) + tr) / n),
            None => {
                self.seed_sum += tr;
                (self.seen >= self.period).then(|| self.seed_sum / n)
            }
        };
        self.value
    }
}

impl Default for AverageTrueRange {
    fn default() -> Self {
        Self::new(14)
    }
}

/// True range of `candle` given the previous bar's close.
#[must_use]
pub fn true_range(candle: &Candle, prev_close: Option<f64>) -> f64 {
    let range = candle.high() - candle.low();
    match prev_close {
        Some(pc) => range
            .max((candle.high() - pc).abs())
            .max((candle.low() - pc).abs()),
        None => range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(open, high, low, close, 100.0, 0.25).unwrap()
    }

    #[test]
    fn true_range_uses_gap_from_previous_close() {
        let candle = bar(105.0, 106.0, 104.0, 105.5);
        assert_eq!(true_range(&candle, None), 2.0);
        // gap up from 100: |106 - 100| = 6
        assert_eq!(true_range(&candle, Some(100.0)), 6.0);
        // gap down from 110: |104 - 110| = 6
        assert_eq!(true_range(&candle, Some(110.0)), 6.0);
    }

    #[test]
    fn warms_up_then_seeds_with_mean() {
        let mut atr = AverageTrueRange::new(3);
        assert_eq!(atr.update(&bar(100.0, 101.0, 99.0, 100.0)), None); // tr 2
        assert_eq!(atr.update(&bar(100.0, 102.0, 99.0, 101.0)), None); // tr 3
        assert!(!atr.is_ready());
        let seeded = atr.update(&bar(101.0, 102.0, 100.0, 101.0)).unwrap(); // tr 2
        assert!((seeded - 7.0 / 3.0).abs() < 1e-12);
        assert!(atr.is_ready());
    }

    #[test]
    fn wilder_smoothing_after_seed() {
        let mut atr = AverageTrueRange::new(2);
        atr.update(&bar(100.0, 101.0, 99.0, 100.0)); // tr 2
        atr.update(&bar(100.0, 102.0, 100.0, 101.0)); // tr 2 -> seed 2
        let next = atr.update(&bar(101.0, 105.0, 101.0, 104.0)).unwrap(); // tr 4
        assert!((next - 3.0).abs() < 1e-12);
        assert_eq!(atr.value(), Some(next));
    }

    #[test]
    fn flat_bars_produce_zero_atr() {
        let mut atr = AverageTrueRange::new(2);
        atr.update(&bar(100.0, 100.0, 100.0, 100.0));
        assert_eq!(atr.update(&bar(100.0, 100.0, 100.0, 100.0)), Some(0.0));
    }
}
