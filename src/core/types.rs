//! Core type definitions for the risk panel
//!
//! These types represent raw market data as fetched and the derived
//! feature rows that flow through the pipeline.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single daily bar for one instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBar {
    /// Trading date of the bar
    pub date: NaiveDate,
    /// Adjusted closing price
    pub close: Decimal,
    /// Highest price during the session
    pub high: Decimal,
    /// Lowest price during the session
    pub low: Decimal,
    /// Volume traded during the session
    pub volume: Decimal,
}

impl RawBar {
    /// Create a new bar
    pub fn new(
        date: NaiveDate,
        close: Decimal,
        high: Decimal,
        low: Decimal,
        volume: Decimal,
    ) -> Self {
        Self { date, close, high, low, volume }
    }

    /// Get the full session range (high - low)
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }
}

/// One instrument-date row of the derived feature panel
///
/// Passthrough fields are guaranteed present by construction. Derived
/// fields stay `None` until their windows have enough history; they are
/// never silently dropped at this stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Instrument identifier
    pub ticker: String,
    /// Trading date of the row
    pub date: NaiveDate,
    /// Adjusted close at t
    pub close: Decimal,
    /// Adjusted close at t-1; none for the first bar of a series
    pub close_lag: Option<Decimal>,
    /// Percent change from the lagged close
    pub return_pct: Option<f64>,
    /// Volume passthrough
    pub volume: Decimal,
    /// High passthrough
    pub high: Decimal,
    /// Low passthrough
    pub low: Decimal,
    /// Trailing empirical quantile of returns (rolling VaR)
    pub rolling_var: Option<f64>,
    /// Sum of the rolling VaR over the trailing target window
    pub target: Option<f64>,
}

impl FeatureRow {
    /// Check if every derived field is defined
    pub fn is_complete(&self) -> bool {
        self.close_lag.is_some()
            && self.return_pct.is_some()
            && self.rolling_var.is_some()
            && self.target.is_some()
    }

    /// Numeric value of a panel column for this row
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Close => self.close.to_f64(),
            Column::CloseLag => self.close_lag.and_then(|d| d.to_f64()),
            Column::Return => self.return_pct,
            Column::Volume => self.volume.to_f64(),
            Column::High => self.high.to_f64(),
            Column::Low => self.low.to_f64(),
            Column::RollingVar => self.rolling_var,
            Column::Target => self.target,
        }
    }
}

/// Numeric columns of the assembled panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Close,
    CloseLag,
    Return,
    Volume,
    High,
    Low,
    RollingVar,
    Target,
}

impl Column {
    /// All panel columns in schema order
    pub const ALL: [Column; 8] = [
        Column::Close,
        Column::CloseLag,
        Column::Return,
        Column::Volume,
        Column::High,
        Column::Low,
        Column::RollingVar,
        Column::Target,
    ];

    /// Get the column name as it appears in the output schema
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Close => "close",
            Column::CloseLag => "close_lag",
            Column::Return => "return",
            Column::Volume => "volume",
            Column::High => "high",
            Column::Low => "low",
            Column::RollingVar => "rolling_var_5",
            Column::Target => "target",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_bar_range() {
        let bar = RawBar::new(
            date("2024-01-02"),
            dec!(101),
            dec!(103),
            dec!(99),
            dec!(1000),
        );
        assert_eq!(bar.range(), dec!(4));
    }

    #[test]
    fn test_row_completeness() {
        let mut row = FeatureRow {
            ticker: "SPY".to_string(),
            date: date("2024-01-02"),
            close: dec!(470),
            close_lag: Some(dec!(468)),
            return_pct: Some(0.42),
            volume: dec!(90000000),
            high: dec!(471),
            low: dec!(467),
            rolling_var: Some(-1.2),
            target: Some(-5.8),
        };
        assert!(row.is_complete());

        row.target = None;
        assert!(!row.is_complete());
    }

    #[test]
    fn test_column_names() {
        assert_eq!(Column::CloseLag.as_str(), "close_lag");
        assert_eq!(Column::RollingVar.as_str(), "rolling_var_5");
        assert_eq!(format!("{}", Column::Return), "return");
    }

    #[test]
    fn test_column_value_lookup() {
        let row = FeatureRow {
            ticker: "X".to_string(),
            date: date("2024-01-03"),
            close: dec!(102),
            close_lag: Some(dec!(100)),
            return_pct: Some(2.0),
            volume: dec!(500),
            high: dec!(103),
            low: dec!(101),
            rolling_var: None,
            target: None,
        };
        assert_eq!(row.value(Column::Close), Some(102.0));
        assert_eq!(row.value(Column::CloseLag), Some(100.0));
        assert_eq!(row.value(Column::Return), Some(2.0));
        assert_eq!(row.value(Column::RollingVar), None);
    }
}
