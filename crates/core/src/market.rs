//! Market observations consumed by the engine.
//!
//! A bar is described by a [`Candle`] (price action) paired with an
//! [`OrderFlowSnapshot`] (aggressive buy/sell imbalance) for the same interval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, EngineError, EngineResult};

/// Color of a candle body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CandleType {
    /// Close above open
    Green,
    /// Close below open
    Red,
    /// Close equals open
    Doji,
}

impl std::fmt::Display for CandleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Green => "GREEN",
            Self::Red => "RED",
            Self::Doji => "DOJI",
        };
        f.write_str(s)
    }
}

/// Tick counts are rounded to this many fractional steps per tick.
const TICK_SNAP: f64 = 1e9;

/// Removes division noise so whole-tick bodies compare exactly,
/// e.g. `0.1 / 0.1` on a 0.1-tick grid yields exactly 1.0.
fn snap_ticks(ticks: f64) -> f64 {
    let snapped = (ticks * TICK_SNAP).round() / TICK_SNAP;
    if snapped.is_finite() {
        snapped
    } else {
        ticks
    }
}

/// One OHLCV observation over a bar interval.
///
/// Immutable once built. The body size is derived at construction and is
/// expressed in ticks (minimum price increments) of the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candle {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    body_size: f64,
}

impl Candle {
    /// Builds a validated candle.
    ///
    /// # Errors
    /// Returns an error if any value is non-finite, `tick_size <= 0`,
    /// `volume < 0`, or the high/low do not bracket open and close.
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        tick_size: f64,
    ) -> EngineResult<Self> {
        ensure_finite("open", open)?;
        ensure_finite("high", high)?;
        ensure_finite("low", low)?;
        ensure_finite("close", close)?;
        ensure_finite("volume", volume)?;
        ensure_finite("tick_size", tick_size)?;

        if tick_size <= 0.0 {
            return Err(EngineError::NonPositiveTickSize(tick_size));
        }
        if volume < 0.0 {
            return Err(EngineError::InvalidCandle(format!(
                "volume must be non-negative, got {volume}"
            )));
        }
        if high < open.max(close) {
            return Err(EngineError::InvalidCandle(format!(
                "high {high} is below body top {}",
                open.max(close)
            )));
        }
        if low > open.min(close) {
            return Err(EngineError::InvalidCandle(format!(
                "low {low} is above body bottom {}",
                open.min(close)
            )));
        }

        Ok(Self {
            open,
            high,
            low,
            close,
            volume,
            body_size: snap_ticks((close - open).abs() / tick_size),
        })
    }

    #[must_use]
    pub const fn open(&self) -> f64 {
        self.open
    }

    #[must_use]
    pub const fn high(&self) -> f64 {
        self.high
    }

    #[must_use]
    pub const fn low(&self) -> f64 {
        self.low
    }

    #[must_use]
    pub const fn close(&self) -> f64 {
        self.close
    }

    #[must_use]
    pub const fn volume(&self) -> f64 {
        self.volume
    }

    /// Absolute body size `|close - open|` in ticks.
    #[must_use]
    pub const fn body_size(&self) -> f64 {
        self.body_size
    }

    #[must_use]
    pub fn is_green(&self) -> bool {
        self.close > self.open
    }

    #[must_use]
    pub fn is_red(&self) -> bool {
        self.close < self.open
    }

    #[must_use]
    pub fn candle_type(&self) -> CandleType {
        if self.is_green() {
            CandleType::Green
        } else if self.is_red() {
            CandleType::Red
        } else {
            CandleType::Doji
        }
    }
}

/// Aggressive buy/sell imbalance for one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFlowSnapshot {
    /// Aggressive buy volume minus aggressive sell volume
    pub delta: f64,
    /// Total traded volume
    pub volume: f64,
    /// Volume traded at the bid (aggressive sells)
    pub bid_volume: f64,
    /// Volume traded at the ask (aggressive buys)
    pub ask_volume: f64,
    /// Reference trade price
    pub price: f64,
    /// Bar timestamp
    pub timestamp: DateTime<Utc>,
}

impl OrderFlowSnapshot {
    /// Creates a snapshot with an explicitly supplied delta.
    #[must_use]
    pub const fn new(
        delta: f64,
        volume: f64,
        bid_volume: f64,
        ask_volume: f64,
        price: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            delta,
            volume,
            bid_volume,
            ask_volume,
            price,
            timestamp,
        }
    }

    /// Builds a snapshot from volume split at bid and ask.
    ///
    /// Delta is `ask_volume - bid_volume` and total volume is their sum.
    #[must_use]
    pub fn from_volumes(
        ask_volume: f64,
        bid_volume: f64,
        price: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            delta: ask_volume - bid_volume,
            volume: ask_volume + bid_volume,
            bid_volume,
            ask_volume,
            price,
            timestamp,
        }
    }

    /// Magnitude of the delta.
    #[must_use]
    pub fn abs_delta(&self) -> f64 {
        self.delta.abs()
    }

    /// Checks that every numeric field is finite.
    ///
    /// # Errors
    /// Returns [`EngineError::NonFinite`] for the first offending field.
    pub fn validate(&self) -> EngineResult<()> {
        ensure_finite("delta", self.delta)?;
        ensure_finite("flow volume", self.volume)?;
        ensure_finite("bid_volume", self.bid_volume)?;
        ensure_finite("ask_volume", self.ask_volume)?;
        ensure_finite("price", self.price)?;
        Ok(())
    }
}

/// A complete per-symbol bar as delivered by a [`BarSource`](crate::BarSource).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarEvent {
    pub symbol: String,
    pub candle: Candle,
    pub order_flow: OrderFlowSnapshot,
}

impl BarEvent {
    #[must_use]
    pub fn new(symbol: impl Into<String>, candle: Candle, order_flow: OrderFlowSnapshot) -> Self {
        Self {
            symbol: symbol.into(),
            candle,
            order_flow,
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.order_flow.timestamp
    }
}
