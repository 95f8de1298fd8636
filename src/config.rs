//! Configuration loader
//!
//! Infrastructure settings for callers that drive the pipeline from a
//! TOML file: instrument list, date range, windowing policy and lag
//! depth. The core itself takes all of these as plain arguments.

use anyhow::Result;
use serde::Deserialize;
use std::fs;

use crate::core::causality::DEFAULT_MAX_LAG;
use crate::core::features::{
    FeatureConfig, DEFAULT_TARGET_WINDOW, DEFAULT_VAR_QUANTILE, DEFAULT_VAR_WINDOW,
};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub system: SystemConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub causality: CausalityConfig,
    pub tickers: Vec<String>,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct SystemConfig {
    pub name: String,
    pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_var_window")]
    pub var_window: usize,
    #[serde(default = "default_var_quantile")]
    pub var_quantile: f64,
    #[serde(default = "default_target_window")]
    pub target_window: usize,
}

fn default_var_window() -> usize {
    DEFAULT_VAR_WINDOW
}

fn default_var_quantile() -> f64 {
    DEFAULT_VAR_QUANTILE
}

fn default_target_window() -> usize {
    DEFAULT_TARGET_WINDOW
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            var_window: default_var_window(),
            var_quantile: default_var_quantile(),
            target_window: default_target_window(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CausalityConfig {
    #[serde(default = "default_max_lag")]
    pub max_lag: u32,
}

fn default_max_lag() -> u32 {
    DEFAULT_MAX_LAG
}

impl Default for CausalityConfig {
    fn default() -> Self {
        Self {
            max_lag: default_max_lag(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }
}

impl FeaturesConfig {
    /// Translate into the builder's windowing policy
    pub fn feature_config(&self) -> FeatureConfig {
        FeatureConfig {
            var_window: self.var_window,
            var_quantile: self.var_quantile,
            target_window: self.target_window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str(
            r#"
            tickers = ["SPY", "QQQ"]
            start_date = "2023-01-01"
            end_date = "2024-01-01"

            [system]
            name = "riskpanel"
            log_level = "info"
            "#,
        )
        .unwrap();

        assert_eq!(config.tickers.len(), 2);
        assert_eq!(config.features.var_window, DEFAULT_VAR_WINDOW);
        assert_eq!(config.features.target_window, DEFAULT_TARGET_WINDOW);
        assert_eq!(config.causality.max_lag, DEFAULT_MAX_LAG);
    }

    #[test]
    fn test_parse_custom_windows() {
        let config: Config = toml::from_str(
            r#"
            tickers = ["SPY"]
            start_date = "2023-01-01"
            end_date = "2024-01-01"

            [system]
            name = "riskpanel"
            log_level = "debug"

            [features]
            var_window = 10
            var_quantile = 0.01

            [causality]
            max_lag = 4
            "#,
        )
        .unwrap();

        let fc = config.features.feature_config();
        assert_eq!(fc.var_window, 10);
        assert!((fc.var_quantile - 0.01).abs() < 1e-12);
        assert_eq!(fc.target_window, DEFAULT_TARGET_WINDOW);
        assert_eq!(config.causality.max_lag, 4);
    }
}
