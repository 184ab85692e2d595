//! Confidence scoring for absorption signals.
//!
//! Confidence is the sum of three terms, capped by a hard ceiling so the
//! engine never reports certainty:
//! - base: `min(|delta| / delta_scale, base_cap)`
//! - body bonus: `min(body_ticks / volatility * body_bonus_factor, body_bonus_cap)`
//! - extreme bonus: flat `extreme_bonus` once `|delta| > extreme_delta`

use deltaflow_core::{ConfidenceConfig, EngineError, EngineResult};

#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    config: ConfidenceConfig,
}

impl ConfidenceScorer {
    #[must_use]
    pub const fn new(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ConfidenceConfig {
        &self.config
    }

    /// Scores a bar, returning a value in `[0, ceiling]`.
    ///
    /// # Errors
    /// Returns [`EngineError::NonPositiveVolatility`] if `volatility <= 0` or is not finite.
    pub fn score(&self, abs_delta: f64, body_size: f64, volatility: f64) -> EngineResult<f64> {
        if !(volatility.is_finite() && volatility > 0.0) {
            return Err(EngineError::NonPositiveVolatility(volatility));
        }
        let c = &self.config;
        let abs_delta = abs_delta.abs();

        let base = (abs_delta / c.delta_scale).min(c.base_cap);
        let body_bonus = (body_size.max(0.0) / volatility * c.body_bonus_factor).min(c.body_bonus_cap);
        let extreme_bonus = if abs_delta > c.extreme_delta {
            c.extreme_bonus
        } else {
            0.0
        };

        Ok((base + body_bonus + extreme_bonus).clamp(0.0, c.ceiling))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> ConfidenceScorer {
        ConfidenceScorer::default()
    }

    #[test]
    fn base_term_ramps_linearly() {
        // 200/500 = 0.4, no body
        let score = scorer().score(200.0, 0.0, 1.0).unwrap();
        assert!((score - 0.4).abs() < 1e-12);
    }

    #[test]
    fn body_bonus_is_capped() {
        // 0.4 + min(2/1 * 0.1, 0.15) = 0.55
        let score = scorer().score(200.0, 2.0, 1.0).unwrap();
        assert!((score - 0.55).abs() < 1e-12);
    }

    #[test]
    fn body_bonus_scales_with_volatility() {
        // 0.4 + 2/4 * 0.1 = 0.45
        let score = scorer().score(200.0, 2.0, 4.0).unwrap();
        assert!((score - 0.45).abs() < 1e-12);
    }

    #[test]
    fn extreme_bonus_applies_above_300() {
        let at = scorer().score(300.0, 0.0, 1.0).unwrap();
        let above = scorer().score(301.0, 0.0, 1.0).unwrap();
        assert!((at - 0.6).abs() < 1e-12);
        assert!((above - (301.0 / 500.0 + 0.05)).abs() < 1e-12);
    }

    #[test]
    fn ceiling_holds_for_huge_inputs() {
        // 0.8 + 0.15 + 0.05 = 1.0, clamped to 0.95
        let score = scorer().score(10_000.0, 50.0, 0.5).unwrap();
        assert!((score - 0.95).abs() < 1e-12);
    }

    #[test]
    fn negative_delta_uses_magnitude() {
        let pos = scorer().score(250.0, 1.0, 2.0).unwrap();
        let neg = scorer().score(-250.0, 1.0, 2.0).unwrap();
        assert_eq!(pos, neg);
    }

    #[test]
    fn rejects_non_positive_volatility() {
        assert_eq!(
            scorer().score(200.0, 2.0, 0.0),
            Err(EngineError::NonPositiveVolatility(0.0))
        );
        assert!(scorer().score(200.0, 2.0, f64::NAN).is_err());
    }

    #[test]
    fn custom_ceiling() {
        let config = ConfidenceConfig {
            ceiling: 0.5,
            ..ConfidenceConfig::default()
        };
        let score = ConfidenceScorer::new(config).score(500.0, 2.0, 1.0).unwrap();
        assert!((score - 0.5).abs() < 1e-12);
    }
}
