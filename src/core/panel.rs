//! Panel assembly
//!
//! Concatenates per-instrument feature sequences and applies the
//! completeness filter: every row with an undefined derived field is
//! dropped. The rows that survive have all columns defined, which is what
//! the causality screen downstream relies on.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::types::{Column, FeatureRow};
use crate::error::{Error, Result};

/// Assembled multi-instrument feature table
///
/// Rows keep instrument insertion order, then date order within each
/// instrument. Read-only after assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturePanel {
    rows: Vec<FeatureRow>,
}

impl FeaturePanel {
    /// Get all rows
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the panel has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row-wise values of one column
    ///
    /// Completeness guarantees every value is defined; a row that somehow
    /// lost a value surfaces as NaN rather than shifting the series.
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.rows
            .iter()
            .map(|r| r.value(column).unwrap_or(f64::NAN))
            .collect()
    }

    /// Distinct tickers in first-appearance order
    pub fn tickers(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for row in &self.rows {
            if !out.contains(&row.ticker) {
                out.push(row.ticker.clone());
            }
        }
        out
    }
}

/// Concatenates feature sequences and enforces completeness
pub struct PanelAssembler;

impl PanelAssembler {
    /// Assemble one panel from per-instrument feature sequences
    ///
    /// Sequences are concatenated in the order given, then every
    /// incomplete row is removed. An instrument whose series never fills
    /// the target window contributes zero rows.
    pub fn assemble(sequences: Vec<Vec<FeatureRow>>) -> Result<FeaturePanel> {
        let total: usize = sequences.iter().map(Vec::len).sum();
        let rows: Vec<FeatureRow> = sequences
            .into_iter()
            .flatten()
            .filter(FeatureRow::is_complete)
            .collect();

        if rows.is_empty() {
            return Err(Error::EmptyPanel);
        }

        info!("[PANEL] kept {} of {} assembled rows", rows.len(), total);
        Ok(FeaturePanel { rows })
    }
}
