use crate::market::BarEvent;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;

/// Upstream supplier of bars, in arrival order.
#[async_trait]
pub trait BarSource: Send {
    /// Returns the next bar, or `None` once the source is exhausted.
    async fn next_bar(&mut self) -> Result<Option<BarEvent>>;
}

/// In-memory source replaying a fixed list of bars.
#[derive(Debug, Default)]
pub struct MemoryBarSource {
    bars: VecDeque<BarEvent>,
}

impl MemoryBarSource {
    #[must_use]
    pub fn new(bars: Vec<BarEvent>) -> Self {
        Self { bars: bars.into() }
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
impl BarSource for MemoryBarSource {
    async fn next_bar(&mut self) -> Result<Option<BarEvent>> {
        Ok(self.bars.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{Candle, OrderFlowSnapshot};
    use chrono::Utc;

    fn bar(symbol: &str, close: f64) -> BarEvent {
        let candle = Candle::new(100.0, close.max(100.0), close.min(100.0), close, 10.0, 1.0)
            .unwrap();
        BarEvent::new(
            symbol,
            candle,
            OrderFlowSnapshot::from_volumes(5.0, 5.0, close, Utc::now()),
        )
    }

    #[tokio::test]
    async fn memory_source_replays_in_order() {
        let mut source = MemoryBarSource::new(vec![bar("ES", 101.0), bar("NQ", 99.0)]);
        assert_eq!(source.len(), 2);

        let first = source.next_bar().await.unwrap().unwrap();
        assert_eq!(first.symbol, "ES");
        let second = source.next_bar().await.unwrap().unwrap();
        assert_eq!(second.symbol, "NQ");
        assert!(source.next_bar().await.unwrap().is_none());
        assert!(source.is_empty());
    }
}
