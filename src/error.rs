//! Error taxonomy for the panel pipeline and causality screening
//!
//! Data-quality errors local to one instrument or one candidate are
//! isolated and reported alongside successful results. Structural errors
//! (empty panel, invalid range) abort the run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The series source could not produce data for a ticker/date range
    #[error("fetch failed for {ticker}: {reason}")]
    Fetch { ticker: String, reason: String },

    /// An instrument's raw series is empty
    #[error("insufficient data for {ticker}: empty series")]
    InsufficientData { ticker: String },

    /// An instrument's raw series is not strictly increasing by date
    #[error("series for {ticker} is not strictly ordered by date")]
    UnorderedSeries { ticker: String },

    /// The assembled, filtered panel has zero rows
    #[error("assembled panel is empty after the completeness filter")]
    EmptyPanel,

    /// A candidate lacks enough aligned, defined observations for the test
    #[error("{candidate}: {observations} joint observations, {required} required")]
    InsufficientJointData {
        candidate: String,
        observations: usize,
        required: usize,
    },

    /// Malformed date string, or start date not before end date
    #[error("invalid date range: {0}")]
    InvalidRange(String),
}

pub type Result<T> = std::result::Result<T, Error>;
