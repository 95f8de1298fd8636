//! Core pipeline logic
//!
//! Feature construction, panel assembly and causality screening:
//!
//! - per-instrument rolling risk features (returns, empirical VaR, target)
//! - completeness-filtered multi-instrument panel
//! - pairwise Granger screening behind an external-test seam

pub mod causality;
pub mod features;
pub mod panel;
pub mod types;

// Re-export commonly used types
pub use causality::{
    CandidateOutcome, CausalityEvaluator, CausalityResult, DatedSeries, GrangerTest,
    LagStat, DEFAULT_MAX_LAG,
};
pub use features::{FeatureBuilder, FeatureConfig};
pub use panel::{FeaturePanel, PanelAssembler};
pub use types::{Column, FeatureRow, RawBar};
