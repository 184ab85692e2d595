//! Trading-session admission gate.
//!
//! A pure clock predicate: a signal computed outside the window is still
//! valid output, but callers should not act on it.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use deltaflow_core::{EngineError, EngineResult, SessionConfig};

#[derive(Debug, Clone, Copy)]
pub struct SessionFilter {
    tz: Tz,
    open: u16,
    close: u16,
}

impl Default for SessionFilter {
    fn default() -> Self {
        Self {
            tz: chrono_tz::America::Los_Angeles,
            open: 630,
            close: 1300,
        }
    }
}

impl SessionFilter {
    /// Creates a filter admitting `[open, close)` local HHMM times in `tz`.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidConfig`] if `open >= close`.
    pub fn new(tz: Tz, open: u16, close: u16) -> EngineResult<Self> {
        if open >= close {
            return Err(EngineError::InvalidConfig(format!(
                "session open ({open}) must be before close ({close})"
            )));
        }
        Ok(Self { tz, open, close })
    }

    /// # Errors
    /// Returns an error for an unknown time zone or an empty window.
    pub fn from_config(config: &SessionConfig) -> EngineResult<Self> {
        Self::new(config.tz()?, config.open, config.close)
    }

    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Local time of day in the reference zone as `hour * 100 + minute`.
    #[must_use]
    pub fn time_of_day<Z: TimeZone>(&self, at: &DateTime<Z>) -> u16 {
        let local = at.with_timezone(&self.tz);
        // hour < 24 and minute < 60, so the result always fits in u16
        u16::try_from(local.hour() * 100 + local.minute()).unwrap_or(u16::MAX)
    }

    /// Returns true if `at` falls inside the trading window.
    #[must_use]
    pub fn is_admissible<Z: TimeZone>(&self, at: &DateTime<Z>) -> bool {
        let hhmm = self.time_of_day(at);
        hhmm >= self.open && hhmm < self.close
    }

    /// Reads the wall clock once and checks it against the window.
    #[must_use]
    pub fn is_admissible_now(&self) -> bool {
        self.is_admissible(&Utc::now())
    }
}
