//! Data Module
//!
//! The series-source seam and the in-memory reference source.
//! Real market-data providers live behind [`SeriesSource`]; the core
//! never talks to a provider directly.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::types::RawBar;

pub use memory::MemorySource;

/// Series source trait - raw market data providers implement this
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Fetch the date-ordered daily bars for one instrument over
    /// `[start, end)`
    ///
    /// An unknown or delisted ticker may come back as an empty sequence;
    /// the pipeline turns that into a per-ticker fetch failure.
    async fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>>;
}
