use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub signal: SignalConfig,
    pub confidence: ConfidenceConfig,
    pub risk: RiskConfig,
    pub divergence: DivergenceConfig,
    pub session: SessionConfig,
    pub report: ReportConfig,
    pub pipeline: PipelineConfig,
}

/// Admission thresholds for the absorption signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Minimum |delta| for a BUY/SELL
    pub delta_threshold: f64,
    /// Minimum candle body, in ticks
    pub min_body_ticks: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// |delta| at which the base term saturates (before `base_cap`)
    pub delta_scale: f64,
    pub base_cap: f64,
    pub body_bonus_factor: f64,
    pub body_bonus_cap: f64,
    /// |delta| above which the flat extreme bonus applies
    pub extreme_delta: f64,
    pub extreme_bonus: f64,
    /// Hard ceiling on reported confidence
    pub ceiling: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Stop distance as a multiple of volatility
    pub stop_multiple: f64,
    /// Target distance as a multiple of volatility
    pub target_multiple: f64,
    /// Fraction of balance risked per trade
    pub max_risk_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivergenceConfig {
    /// Bars inspected per detection
    pub window: usize,
    pub weakening_ratio: f64,
    pub strengthening_ratio: f64,
    /// |recent delta sum| that maps to full strength
    pub strength_scale: f64,
}

/// Trading window, as HHMM local times in `timezone`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub timezone: String,
    /// Inclusive start
    pub open: u16,
    /// Exclusive end
    pub close: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// One side must outnumber the other by more than this ratio to set a bias
    pub bias_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub atr_period: usize,
    pub channel_capacity: usize,
    pub account_balance: f64,
    pub tick_size: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            delta_threshold: 150.0,
            min_body_ticks: 1.0,
        }
    }
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            delta_scale: 500.0,
            base_cap: 0.8,
            body_bonus_factor: 0.1,
            body_bonus_cap: 0.15,
            extreme_delta: 300.0,
            extreme_bonus: 0.05,
            ceiling: 0.95,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            stop_multiple: 1.5,
            target_multiple: 2.0,
            max_risk_fraction: 0.02,
        }
    }
}

impl Default for DivergenceConfig {
    fn default() -> Self {
        Self {
            window: 5,
            weakening_ratio: 0.5,
            strengthening_ratio: 1.5,
            strength_scale: 1000.0,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timezone: "America/Los_Angeles".to_string(),
            open: 630,
            close: 1300,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { bias_ratio: 1.5 }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            atr_period: 14,
            channel_capacity: 1024,
            account_balance: 10_000.0,
            tick_size: 1.0,
        }
    }
}

impl SessionConfig {
    /// Parses the configured time zone.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidTimezone`] if the name is unknown.
    pub fn tz(&self) -> EngineResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| EngineError::InvalidTimezone(self.timezone.clone()))
    }
}

impl EngineConfig {
    /// Checks every section for values the engine cannot work with.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> EngineResult<()> {
        positive("signal.delta_threshold", self.signal.delta_threshold)?;
        non_negative("signal.min_body_ticks", self.signal.min_body_ticks)?;

        let c = &self.confidence;
        positive("confidence.delta_scale", c.delta_scale)?;
        non_negative("confidence.base_cap", c.base_cap)?;
        non_negative("confidence.body_bonus_factor", c.body_bonus_factor)?;
        non_negative("confidence.body_bonus_cap", c.body_bonus_cap)?;
        non_negative("confidence.extreme_delta", c.extreme_delta)?;
        non_negative("confidence.extreme_bonus", c.extreme_bonus)?;
        if !(c.ceiling > 0.0 && c.ceiling <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "confidence.ceiling must be in (0, 1], got {}",
                c.ceiling
            )));
        }

        positive("risk.stop_multiple", self.risk.stop_multiple)?;
        positive("risk.target_multiple", self.risk.target_multiple)?;
        if !(self.risk.max_risk_fraction > 0.0 && self.risk.max_risk_fraction <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "risk.max_risk_fraction must be in (0, 1], got {}",
                self.risk.max_risk_fraction
            )));
        }

        let d = &self.divergence;
        if d.window < 5 {
            return Err(EngineError::InvalidConfig(format!(
                "divergence.window must be at least 5, got {}",
                d.window
            )));
        }
        positive("divergence.weakening_ratio", d.weakening_ratio)?;
        positive("divergence.strengthening_ratio", d.strengthening_ratio)?;
        positive("divergence.strength_scale", d.strength_scale)?;

        let s = &self.session;
        s.tz()?;
        hhmm("session.open", s.open)?;
        hhmm("session.close", s.close)?;
        if s.open >= s.close {
            return Err(EngineError::InvalidConfig(format!(
                "session.open ({}) must be before session.close ({})",
                s.open, s.close
            )));
        }

        positive("report.bias_ratio", self.report.bias_ratio)?;

        let p = &self.pipeline;
        if p.atr_period == 0 {
            return Err(EngineError::InvalidConfig(
                "pipeline.atr_period must be at least 1".to_string(),
            ));
        }
        if p.channel_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "pipeline.channel_capacity must be at least 1".to_string(),
            ));
        }
        positive("pipeline.account_balance", p.account_balance)?;
        positive("pipeline.tick_size", p.tick_size)?;

        Ok(())
    }
}

fn positive(name: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "{name} must be non-negative, got {value}"
        )))
    }
}

fn hhmm(name: &str, value: u16) -> EngineResult<()> {
    if value / 100 < 24 && value % 100 < 60 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "{name} is not a valid HHMM time: {value}"
        )))
    }
}
