//! Panel pipeline
//!
//! Composition root of the core: validate the date range, fetch each
//! instrument in input order, build its feature rows, assemble the
//! filtered panel. Per-instrument failures are isolated and reported next
//! to the panel; only structural errors abort the run.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::core::features::{FeatureBuilder, FeatureConfig};
use crate::core::panel::{FeaturePanel, PanelAssembler};
use crate::data::SeriesSource;
use crate::error::{Error, Result};

/// A per-ticker failure recorded during a run
#[derive(Debug)]
pub struct TickerFailure {
    /// The instrument that failed
    pub ticker: String,
    /// What went wrong
    pub error: Error,
}

/// Output of one pipeline run
///
/// Callers get the filtered panel plus every isolated failure by name --
/// never a silently truncated result.
#[derive(Debug)]
pub struct PanelReport {
    pub panel: FeaturePanel,
    pub failures: Vec<TickerFailure>,
}

/// Fetch-then-transform pipeline over a list of instruments
///
/// Instruments are processed sequentially in input order and the panel
/// preserves that order, so runs are deterministic. Fetching is the only
/// await point.
pub struct PanelPipeline<S: SeriesSource> {
    source: S,
    builder: FeatureBuilder,
}

impl<S: SeriesSource> PanelPipeline<S> {
    /// Create a pipeline with the default windowing policy
    pub fn new(source: S) -> Self {
        Self {
            source,
            builder: FeatureBuilder::new(),
        }
    }

    /// Create a pipeline with a custom windowing policy
    pub fn with_config(source: S, config: FeatureConfig) -> Self {
        Self {
            source,
            builder: FeatureBuilder::with_config(config),
        }
    }

    /// Run the pipeline for `tickers` over `[start, end)`
    ///
    /// The range is validated before any fetch. A ticker that fails to
    /// fetch or to build lands in the report's failures and the run moves
    /// on; an empty assembled panel aborts with [`Error::EmptyPanel`].
    pub async fn run(
        &self,
        tickers: &[String],
        start: &str,
        end: &str,
    ) -> Result<PanelReport> {
        let (start, end) = parse_range(start, end)?;

        let mut sequences = Vec::with_capacity(tickers.len());
        let mut failures = Vec::new();

        for ticker in tickers {
            let bars = match self.source.fetch(ticker, start, end).await {
                Ok(bars) => bars,
                Err(e) => {
                    warn!("[PIPELINE] fetch failed for {}: {:#}", ticker, e);
                    failures.push(TickerFailure {
                        ticker: ticker.clone(),
                        error: Error::Fetch {
                            ticker: ticker.clone(),
                            reason: format!("{:#}", e),
                        },
                    });
                    continue;
                }
            };

            if bars.is_empty() {
                warn!("[PIPELINE] no data for {} in range", ticker);
                failures.push(TickerFailure {
                    ticker: ticker.clone(),
                    error: Error::Fetch {
                        ticker: ticker.clone(),
                        reason: "empty series for range".to_string(),
                    },
                });
                continue;
            }

            match self.builder.build(ticker, &bars) {
                Ok(rows) => {
                    info!("[PIPELINE] {}: {} bars", ticker, rows.len());
                    sequences.push(rows);
                }
                Err(e) => {
                    warn!("[PIPELINE] {}", e);
                    failures.push(TickerFailure {
                        ticker: ticker.clone(),
                        error: e,
                    });
                }
            }
        }

        let panel = PanelAssembler::assemble(sequences)?;
        info!(
            "[PIPELINE] panel ready: {} rows, {} tickers, {} failures",
            panel.len(),
            panel.tickers().len(),
            failures.len()
        );
        Ok(PanelReport { panel, failures })
    }
}

/// Parse and validate a YYYY-MM-DD date range; start must precede end
pub fn parse_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate)> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    if start >= end {
        return Err(Error::InvalidRange(format!(
            "start {} is not before end {}",
            start, end
        )));
    }
    Ok((start, end))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| Error::InvalidRange(format!("malformed date: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RawBar;
    use crate::data::MemorySource;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bars(n: usize) -> Vec<RawBar> {
        (0..n)
            .map(|i| RawBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Days::new(i as u64),
                close: Decimal::from(100 + (i * 3) % 11),
                high: Decimal::from(115),
                low: Decimal::from(95),
                volume: dec!(1000),
            })
            .collect()
    }

    /// Counts fetches and always errors
    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl crate::data::SeriesSource for CountingSource {
        async fn fetch(
            &self,
            _ticker: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> anyhow::Result<Vec<RawBar>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("provider down"))
        }
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[tokio::test]
    async fn test_invalid_range_fails_before_any_fetch() {
        init_tracing();
        let source = CountingSource::default();
        let pipeline = PanelPipeline::new(source);

        let err = pipeline
            .run(&["SPY".to_string()], "2024-06-01", "2024-01-01")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRange(_)));
        assert_eq!(pipeline.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_date_rejected() {
        let source = MemorySource::new();
        let pipeline = PanelPipeline::new(source);

        let err = pipeline
            .run(&["SPY".to_string()], "2024-13-01", "2024-12-31")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRange(_)));

        let err = pipeline
            .run(&["SPY".to_string()], "06/01/2024", "2024-12-31")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRange(_)));
    }

    #[tokio::test]
    async fn test_partial_failure_is_isolated() {
        init_tracing();
        let mut source = MemorySource::new();
        source.insert("GOOD", bars(15));
        // "GONE" is never inserted -> empty fetch result

        let pipeline = PanelPipeline::new(source);
        let report = pipeline
            .run(
                &["GOOD".to_string(), "GONE".to_string()],
                "2024-01-01",
                "2024-02-01",
            )
            .await
            .unwrap();

        assert_eq!(report.panel.tickers(), vec!["GOOD".to_string()]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].ticker, "GONE");
        assert!(matches!(report.failures[0].error, Error::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_all_failures_yield_empty_panel() {
        let source = MemorySource::new();
        let pipeline = PanelPipeline::new(source);

        let err = pipeline
            .run(&["A".to_string(), "B".to_string()], "2024-01-01", "2024-02-01")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyPanel));
    }

    #[tokio::test]
    async fn test_too_short_series_yields_empty_panel() {
        let mut source = MemorySource::new();
        source.insert("TINY", bars(3));
        let pipeline = PanelPipeline::new(source);

        // The rows build fine but none survive the completeness filter
        let err = pipeline
            .run(&["TINY".to_string()], "2024-01-01", "2024-02-01")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyPanel));
    }

    #[tokio::test]
    async fn test_panel_preserves_input_order() {
        let mut source = MemorySource::new();
        source.insert("A", bars(12));
        source.insert("B", bars(12));
        let pipeline = PanelPipeline::new(source);

        let report = pipeline
            .run(
                &["B".to_string(), "A".to_string()],
                "2024-01-01",
                "2024-02-01",
            )
            .await
            .unwrap();
        assert_eq!(
            report.panel.tickers(),
            vec!["B".to_string(), "A".to_string()]
        );
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_full_run_feeds_causality_screen() {
        use crate::core::causality::{CausalityEvaluator, GrangerTest, LagStat};
        use crate::core::types::Column;
        use std::collections::BTreeMap;

        struct StubTest;

        impl GrangerTest for StubTest {
            fn test(
                &self,
                target: &[f64],
                candidate: &[f64],
                max_lag: u32,
            ) -> anyhow::Result<BTreeMap<u32, LagStat>> {
                assert_eq!(target.len(), candidate.len());
                Ok((1..=max_lag)
                    .map(|lag| (lag, LagStat { statistic: 1.0, p_value: 0.5 }))
                    .collect())
            }
        }

        init_tracing();
        let mut source = MemorySource::new();
        source.insert("SPY", bars(25));
        source.insert("QQQ", bars(25));

        let pipeline = PanelPipeline::new(source);
        let report = pipeline
            .run(
                &["SPY".to_string(), "QQQ".to_string()],
                "2024-01-01",
                "2024-02-01",
            )
            .await
            .unwrap();

        // 25 bars per ticker, first 5 rows each dropped by the filter
        assert_eq!(report.panel.len(), 40);

        let evaluator = CausalityEvaluator::new(StubTest);
        let result = evaluator.evaluate_by_column(&report.panel, Column::Target);
        assert_eq!(result.outcomes.len(), 7);
        assert!(result.outcomes.values().all(|o| o.is_tested()));
    }

    #[test]
    fn test_parse_range() {
        assert!(parse_range("2024-01-01", "2024-06-01").is_ok());
        assert!(matches!(
            parse_range("2024-01-01", "2024-01-01"),
            Err(Error::InvalidRange(_))
        ));
        assert!(matches!(
            parse_range("not-a-date", "2024-01-01"),
            Err(Error::InvalidRange(_))
        ));
    }
}
