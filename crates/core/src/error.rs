//! Error type shared by every delta-flow component.
//!
//! Invalid caller input is reported eagerly so that no NaN or infinite value
//! can ever reach a [`Signal`](crate::Signal). Conditions that are part of
//! normal operation (warm-up history, doji bars, zero delta) are not errors.

use thiserror::Error;

/// Errors produced by the delta-flow engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Instrument identifier was empty or whitespace.
    #[error("symbol must not be empty")]
    EmptySymbol,

    /// Volatility measure (e.g. ATR) was zero or negative.
    #[error("volatility must be positive, got {0}")]
    NonPositiveVolatility(f64),

    /// Distance between entry and stop was zero or negative.
    #[error("stop distance must be positive, got {0}")]
    NonPositiveStopDistance(f64),

    /// Account balance was zero or negative.
    #[error("account balance must be positive, got {0}")]
    NonPositiveBalance(f64),

    /// Confidence outside [0.0, 1.0].
    #[error("confidence must be in [0.0, 1.0], got {0}")]
    ConfidenceOutOfRange(f64),

    /// Tick size was zero or negative.
    #[error("tick size must be positive, got {0}")]
    NonPositiveTickSize(f64),

    /// OHLC values are inconsistent (e.g. high below close).
    #[error("invalid candle: {0}")]
    InvalidCandle(String),

    /// A numeric input was NaN or infinite.
    #[error("{field} must be finite, got {value}")]
    NonFinite {
        /// Name of the offending input
        field: &'static str,
        /// The rejected value
        value: f64,
    },

    /// Time zone name not present in the tz database.
    #[error("unknown time zone: {0}")]
    InvalidTimezone(String),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results returned by the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Rejects NaN and infinite values.
///
/// # Errors
/// Returns [`EngineError::NonFinite`] naming `field` if `value` is not finite.
pub fn ensure_finite(field: &'static str, value: f64) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::NonFinite { field, value })
    }
}
