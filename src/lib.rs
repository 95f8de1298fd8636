//! Risk feature panel and Granger causality screening
//!
//! Turns raw daily price series into a panel of rolling risk statistics
//! and screens which covariate series Granger-cause a chosen target:
//!
//! - per-instrument features: percent return, rolling empirical VaR,
//!   summed-VaR target
//! - panel assembly with a destructive completeness filter
//! - pairwise causality screening with per-candidate error isolation
//!
//! Market data retrieval and the hypothesis test itself are capability
//! seams ([`data::SeriesSource`], [`core::causality::GrangerTest`]);
//! callers plug in their own providers.

pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod pipeline;
