//! In-memory series source
//!
//! Serves pre-loaded bar series from memory. Used as the reference
//! source in tests and by callers that already hold their data.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use super::SeriesSource;
use crate::core::types::RawBar;

/// Series source backed by per-ticker bar vectors
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    series: HashMap<String, Vec<RawBar>>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the full bar series for a ticker, sorted by date
    ///
    /// Replaces any series already stored under the same ticker.
    pub fn insert(&mut self, ticker: &str, mut bars: Vec<RawBar>) {
        bars.sort_by_key(|b| b.date);
        self.series.insert(ticker.to_string(), bars);
    }

    /// Get the stored tickers, sorted
    pub fn tickers(&self) -> Vec<String> {
        let mut out: Vec<String> = self.series.keys().cloned().collect();
        out.sort();
        out
    }

    /// Get the number of stored series
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Check if no series are stored
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[async_trait]
impl SeriesSource for MemorySource {
    async fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>> {
        // Unknown ticker behaves like a delisted one: empty sequence
        let bars = self.series.get(ticker).cloned().unwrap_or_default();
        Ok(bars
            .into_iter()
            .filter(|b| b.date >= start && b.date < end)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar(day: u32) -> RawBar {
        RawBar {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            close: dec!(100),
            high: dec!(101),
            low: dec!(99),
            volume: dec!(1000),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[tokio::test]
    async fn test_range_slice() {
        let mut source = MemorySource::new();
        source.insert("SPY", (1..=20).map(bar).collect());

        let bars = source.fetch("SPY", date(5), date(10)).await.unwrap();
        assert_eq!(bars.len(), 5);
        assert_eq!(bars.first().unwrap().date, date(5));
        // End is exclusive
        assert_eq!(bars.last().unwrap().date, date(9));
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_empty() {
        let source = MemorySource::new();
        let bars = source.fetch("NOPE", date(1), date(10)).await.unwrap();
        assert!(bars.is_empty());
    }

    #[tokio::test]
    async fn test_insert_sorts_bars() {
        let mut source = MemorySource::new();
        source.insert("SPY", vec![bar(9), bar(3), bar(6)]);

        let bars = source.fetch("SPY", date(1), date(20)).await.unwrap();
        let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date(3), date(6), date(9)]);
    }

    #[test]
    fn test_ticker_listing() {
        let mut source = MemorySource::new();
        assert!(source.is_empty());

        source.insert("QQQ", vec![bar(1)]);
        source.insert("SPY", vec![bar(1)]);
        assert_eq!(source.len(), 2);
        assert_eq!(source.tickers(), vec!["QQQ".to_string(), "SPY".to_string()]);
    }
}
