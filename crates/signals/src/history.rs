//! Caller-owned rolling window of recent bars for divergence detection.

use deltaflow_core::Candle;
use std::collections::VecDeque;

/// Bounded FIFO of `(candle, delta)` pairs, oldest first.
#[derive(Debug, Clone)]
pub struct BarHistory {
    capacity: usize,
    candles: VecDeque<Candle>,
    deltas: VecDeque<f64>,
}

impl BarHistory {
    /// Creates an empty history holding at most `capacity` bars (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            candles: VecDeque::with_capacity(capacity),
            deltas: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a bar, evicting the oldest one when full.
    pub fn push(&mut self, candle: Candle, delta: f64) {
        if self.candles.len() >= self.capacity {
            self.candles.pop_front();
            self.deltas.pop_front();
        }
        self.candles.push_back(candle);
        self.deltas.push_back(delta);
    }

    pub fn clear(&mut self) {
        self.candles.clear();
        self.deltas.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.candles.len() == self.capacity
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Candles in chronological order.
    #[must_use]
    pub fn candles(&self) -> Vec<Candle> {
        self.candles.iter().copied().collect()
    }

    /// Deltas in chronological order.
    #[must_use]
    pub fn deltas(&self) -> Vec<f64> {
        self.deltas.iter().copied().collect()
    }
}
