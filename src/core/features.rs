//! Feature construction for one instrument's series
//!
//! Turns a date-ordered run of raw bars into feature rows:
//! - percent return from the lagged close
//! - rolling empirical VaR of returns (growing window)
//! - target: sum of the rolling VaR over a trailing window
//!
//! Pure transform: output length equals input length, missing values are
//! explicit `None`s, no rows are dropped here.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use super::types::{FeatureRow, RawBar};
use crate::error::{Error, Result};

/// Default trailing window for the rolling VaR quantile (one trading week)
pub const DEFAULT_VAR_WINDOW: usize = 5;

/// Default quantile for the VaR estimate (5th percentile of returns)
pub const DEFAULT_VAR_QUANTILE: f64 = 0.05;

/// Default trailing window for the summed VaR target
pub const DEFAULT_TARGET_WINDOW: usize = 5;

/// Windowing policy for feature construction
#[derive(Debug, Clone, Copy)]
pub struct FeatureConfig {
    /// Row window for the rolling VaR quantile; grows until full
    pub var_window: usize,
    /// Quantile of the return distribution used as VaR
    pub var_quantile: f64,
    /// Row window for the summed target; every slot must be defined
    pub target_window: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            var_window: DEFAULT_VAR_WINDOW,
            var_quantile: DEFAULT_VAR_QUANTILE,
            target_window: DEFAULT_TARGET_WINDOW,
        }
    }
}

/// Builds the feature row sequence for a single instrument
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    config: FeatureConfig,
}

impl FeatureBuilder {
    /// Create a builder with the default windowing policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with a custom windowing policy
    pub fn with_config(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Get the windowing policy
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Build feature rows from a date-ordered bar series
    ///
    /// The series must be strictly increasing by date; calendar gaps are
    /// fine. Derived fields without enough history come back as `None`.
    pub fn build(&self, ticker: &str, bars: &[RawBar]) -> Result<Vec<FeatureRow>> {
        if bars.is_empty() {
            return Err(Error::InsufficientData {
                ticker: ticker.to_string(),
            });
        }
        if bars.windows(2).any(|w| w[0].date >= w[1].date) {
            return Err(Error::UnorderedSeries {
                ticker: ticker.to_string(),
            });
        }

        let returns = Self::returns(bars);
        let vars = self.rolling_quantile(&returns);
        let targets = self.rolling_sum(&vars);

        let rows: Vec<FeatureRow> = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| FeatureRow {
                ticker: ticker.to_string(),
                date: bar.date,
                close: bar.close,
                close_lag: (i > 0).then(|| bars[i - 1].close),
                return_pct: returns[i],
                volume: bar.volume,
                high: bar.high,
                low: bar.low,
                rolling_var: vars[i],
                target: targets[i],
            })
            .collect();

        debug!("[FEATURES] {}: built {} rows", ticker, rows.len());
        Ok(rows)
    }

    /// Percent change from the lagged close; the first bar has no lag.
    /// A zero lagged close yields an undefined return, not a blowup.
    fn returns(bars: &[RawBar]) -> Vec<Option<f64>> {
        let hundred = Decimal::from(100);
        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                if i == 0 {
                    return None;
                }
                let lag = bars[i - 1].close;
                if lag.is_zero() {
                    return None;
                }
                ((bar.close / lag - Decimal::ONE) * hundred).to_f64()
            })
            .collect()
    }

    /// Empirical quantile of the defined returns in each trailing window
    ///
    /// The window covers up to `var_window` rows ending at the current one
    /// and needs at least one defined return, so the value is defined from
    /// the first return onward.
    fn rolling_quantile(&self, returns: &[Option<f64>]) -> Vec<Option<f64>> {
        (0..returns.len())
            .map(|i| {
                let lo = (i + 1).saturating_sub(self.config.var_window);
                let mut window: Vec<f64> =
                    returns[lo..=i].iter().flatten().copied().collect();
                if window.is_empty() {
                    return None;
                }
                window.sort_by(|a, b| {
                    a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
                });
                Some(quantile(&window, self.config.var_quantile))
            })
            .collect()
    }

    /// Sum over each trailing `target_window` rows; every slot in the
    /// window must be defined, so the first defined value appears one row
    /// after the VaR window has filled.
    fn rolling_sum(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let w = self.config.target_window;
        (0..values.len())
            .map(|i| {
                if i + 1 < w {
                    return None;
                }
                let window = &values[i + 1 - w..=i];
                if window.iter().any(Option::is_none) {
                    return None;
                }
                Some(window.iter().flatten().sum())
            })
            .collect()
    }
}

/// Quantile by linear interpolation between order statistics
///
/// `sorted` must be non-empty and ascending.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (sorted[hi] - sorted[lo]) * (h - lo as f64)
}
