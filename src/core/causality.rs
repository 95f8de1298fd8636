//! Granger causality screening
//!
//! Pairwise screening of candidate series against a target series:
//! - by panel column, where the two-column sample is aligned by
//!   construction
//! - by explicit series, inner-joined on date per candidate
//!
//! The hypothesis test itself is an external capability. Implementors of
//! [`GrangerTest`] supply the per-lag statistics; this module owns
//! alignment, the missing-value policy and per-candidate error isolation.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::panel::FeaturePanel;
use super::types::Column;
use crate::error::Error;

/// Maximum lag depth tested per candidate
pub const DEFAULT_MAX_LAG: u32 = 10;

/// Per-lag output of the external hypothesis test
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LagStat {
    /// Test statistic at this lag
    pub statistic: f64,
    /// P-value at this lag (lower = more significant)
    pub p_value: f64,
}

/// External hypothesis-test capability
///
/// Given the aligned `[target, candidate]` sample, returns per-lag
/// statistics for lags `1..=max_lag`. The test internals live behind this
/// trait; the evaluator never inspects them.
pub trait GrangerTest: Send + Sync {
    fn test(
        &self,
        target: &[f64],
        candidate: &[f64],
        max_lag: u32,
    ) -> anyhow::Result<BTreeMap<u32, LagStat>>;
}

/// Outcome recorded for one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CandidateOutcome {
    /// Test ran; per-lag statistics keyed by lag
    Tested(BTreeMap<u32, LagStat>),
    /// Too few aligned, defined observations for the requested lag depth
    InsufficientJointData { observations: usize, required: usize },
    /// The external test failed for this candidate
    TestFailed(String),
}

impl CandidateOutcome {
    /// Check if the test actually ran
    pub fn is_tested(&self) -> bool {
        matches!(self, CandidateOutcome::Tested(_))
    }

    /// Get the per-lag statistics if the test ran
    pub fn lag_stats(&self) -> Option<&BTreeMap<u32, LagStat>> {
        match self {
            CandidateOutcome::Tested(stats) => Some(stats),
            _ => None,
        }
    }
}

/// Result of screening one target against a set of candidates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalityResult {
    /// Identifier of the target series
    pub target: String,
    /// Maximum lag depth used
    pub max_lag: u32,
    /// One outcome per candidate, in the order candidates were supplied
    pub outcomes: IndexMap<String, CandidateOutcome>,
}

impl CausalityResult {
    /// Candidates whose best p-value across lags is below `alpha`
    pub fn significant(&self, alpha: f64) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|(name, outcome)| {
                let stats = outcome.lag_stats()?;
                let best = stats
                    .values()
                    .map(|s| s.p_value)
                    .fold(f64::INFINITY, f64::min);
                (best < alpha).then_some(name.as_str())
            })
            .collect()
    }
}

/// A named, date-indexed numeric series
///
/// Input shape for the by-series entry point. Points are kept sorted by
/// date; dates are assumed unique within one series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatedSeries {
    name: String,
    points: Vec<(NaiveDate, f64)>,
}

impl DatedSeries {
    /// Create a series from date/value pairs
    pub fn new(name: impl Into<String>, mut points: Vec<(NaiveDate, f64)>) -> Self {
        points.sort_by_key(|(d, _)| *d);
        Self {
            name: name.into(),
            points,
        }
    }

    /// Get the series name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Inner join on date: values of both series at shared dates only
    fn join(&self, other: &DatedSeries) -> (Vec<f64>, Vec<f64>) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.points.len() && j < other.points.len() {
            match self.points[i].0.cmp(&other.points[j].0) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    left.push(self.points[i].1);
                    right.push(other.points[j].1);
                    i += 1;
                    j += 1;
                }
            }
        }
        (left, right)
    }
}

/// Runs the external test between a target and each candidate
///
/// Candidates are processed independently; a failure for one is recorded
/// in its own slot and never blocks the rest.
pub struct CausalityEvaluator<T: GrangerTest> {
    test: T,
    max_lag: u32,
}

impl<T: GrangerTest> CausalityEvaluator<T> {
    /// Create an evaluator with the default lag depth
    pub fn new(test: T) -> Self {
        Self {
            test,
            max_lag: DEFAULT_MAX_LAG,
        }
    }

    /// Create an evaluator with a custom lag depth
    pub fn with_max_lag(test: T, max_lag: u32) -> Self {
        Self { test, max_lag }
    }

    /// Get the lag depth
    pub fn max_lag(&self) -> u32 {
        self.max_lag
    }

    /// Screen every other panel column against `target`
    ///
    /// Both columns of each sample come from the same panel rows, so they
    /// are aligned by construction; this is a thin adapter over the shared
    /// sample path.
    pub fn evaluate_by_column(
        &self,
        panel: &FeaturePanel,
        target: Column,
    ) -> CausalityResult {
        let target_values = panel.column(target);
        let mut outcomes = IndexMap::new();
        for column in Column::ALL {
            if column == target {
                continue;
            }
            let outcome = self.evaluate_sample(
                column.as_str(),
                &target_values,
                &panel.column(column),
            );
            outcomes.insert(column.as_str().to_string(), outcome);
        }
        info!(
            "[CAUSAL] screened {} columns against {}",
            outcomes.len(),
            target
        );
        CausalityResult {
            target: target.as_str().to_string(),
            max_lag: self.max_lag,
            outcomes,
        }
    }

    /// Screen each candidate series against the target
    ///
    /// Each candidate is inner-joined with the target on date before the
    /// shared sample path runs.
    pub fn evaluate_by_series(
        &self,
        target: &DatedSeries,
        candidates: &[DatedSeries],
    ) -> CausalityResult {
        let mut outcomes = IndexMap::new();
        for candidate in candidates {
            let (t, c) = target.join(candidate);
            let outcome = self.evaluate_sample(candidate.name(), &t, &c);
            outcomes.insert(candidate.name().to_string(), outcome);
        }
        info!(
            "[CAUSAL] screened {} series against {}",
            outcomes.len(),
            target.name()
        );
        CausalityResult {
            target: target.name().to_string(),
            max_lag: self.max_lag,
            outcomes,
        }
    }

    /// Shared sample path: drop pairs where either value is undefined,
    /// enforce the observation floor, invoke the external test
    fn evaluate_sample(
        &self,
        name: &str,
        target: &[f64],
        candidate: &[f64],
    ) -> CandidateOutcome {
        let (t, c): (Vec<f64>, Vec<f64>) = target
            .iter()
            .zip(candidate)
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .map(|(a, b)| (*a, *b))
            .unzip();

        let required = self.max_lag as usize + 1;
        if t.len() < required {
            let err = Error::InsufficientJointData {
                candidate: name.to_string(),
                observations: t.len(),
                required,
            };
            warn!("[CAUSAL] {}", err);
            return CandidateOutcome::InsufficientJointData {
                observations: t.len(),
                required,
            };
        }

        match self.test.test(&t, &c, self.max_lag) {
            Ok(stats) => CandidateOutcome::Tested(stats),
            Err(e) => {
                warn!("[CAUSAL] test failed for {}: {:#}", name, e);
                CandidateOutcome::TestFailed(format!("{:#}", e))
            }
        }
    }
}
