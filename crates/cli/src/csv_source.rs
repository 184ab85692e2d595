use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deltaflow_core::{BarEvent, BarSource, Candle, OrderFlowSnapshot};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One CSV row: `timestamp,symbol,open,high,low,close,volume,bid_volume,ask_volume[,delta]`.
#[derive(Debug, Deserialize)]
struct BarRecord {
    timestamp: DateTime<Utc>,
    symbol: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    bid_volume: f64,
    ask_volume: f64,
    #[serde(default)]
    delta: Option<f64>,
}

impl BarRecord {
    fn into_event(self, tick_size: f64) -> Result<BarEvent> {
        let candle = Candle::new(
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            tick_size,
        )?;
        let delta = self
            .delta
            .unwrap_or(self.ask_volume - self.bid_volume);
        // The volume column is authoritative; bid + ask may omit unclassified trades
        let order_flow = OrderFlowSnapshot::new(
            delta,
            self.volume,
            self.bid_volume,
            self.ask_volume,
            self.close,
            self.timestamp,
        );
        Ok(BarEvent::new(self.symbol, candle, order_flow))
    }
}

/// Replays historical bars from a CSV file.
///
/// When the `delta` column is absent or empty it is derived as
/// `ask_volume - bid_volume`.
pub struct CsvBarSource {
    bars: Vec<BarEvent>,
    current_index: usize,
}

impl CsvBarSource {
    /// Loads every bar from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The CSV file cannot be opened
    /// - A row is missing a column or fails to parse
    /// - A row describes an invalid candle
    pub fn from_csv(path: impl AsRef<Path>, tick_size: f64) -> Result<Self> {
        let path = path.as_ref();
        let reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
        Self::from_csv_reader(reader, tick_size)
    }

    /// Loads every bar from an in-memory CSV document with a header row.
    ///
    /// # Errors
    ///
    /// See [`CsvBarSource::from_csv`].
    pub fn from_reader<R: Read>(input: R, tick_size: f64) -> Result<Self> {
        Self::from_csv_reader(csv::Reader::from_reader(input), tick_size)
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>, tick_size: f64) -> Result<Self> {
        let mut bars = Vec::new();

        for (index, result) in reader.deserialize::<BarRecord>().enumerate() {
            // Header is line 1
            let line = index + 2;
            let record = result.with_context(|| format!("Failed to parse CSV line {line}"))?;
            let bar = record
                .into_event(tick_size)
                .with_context(|| format!("Invalid bar on CSV line {line}"))?;
            bars.push(bar);
        }

        // Stable sort keeps file order for bars sharing a timestamp
        bars.sort_by_key(BarEvent::timestamp);

        tracing::debug!(bars = bars.len(), "CSV bars loaded");

        Ok(Self {
            bars,
            current_index: 0,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

#[async_trait]
impl BarSource for CsvBarSource {
    async fn next_bar(&mut self) -> Result<Option<BarEvent>> {
        if self.current_index < self.bars.len() {
            let bar = self.bars[self.current_index].clone();
            self.current_index += 1;
            Ok(Some(bar))
        } else {
            Ok(None)
        }
    }
}
