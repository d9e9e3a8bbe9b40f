//! Hedge Configuration Module
//!
//! Loads the market, hedge, search and axis parameters of a curve
//! computation from TOML with `HEDGE_`-prefixed environment overrides.
//! Every key is optional; missing keys take the values in [`crate::defaults`].

use anyhow::{ensure, Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::defaults;

/// Main hedge configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct HedgeConfig {
    pub market: MarketConfig,
    pub hedge: HedgeLegConfig,
    pub search: SearchConfig,
    pub axis: AxisConfig,
}

/// Spot price and AMM position bounds
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MarketConfig {
    pub price_now: Decimal,
    pub range_lower: Decimal,
    pub range_upper: Decimal,
}

/// Budget and short-leg settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HedgeLegConfig {
    pub total_budget: Decimal,
    pub short_reference_price: Decimal,
    /// Price the equal-PNL split is balanced at; the range lower bound when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price: Option<Decimal>,
    pub leverage: Decimal,
    pub amm_scale: Decimal,
    pub short_scale: Decimal,
}

/// Step sizes and limits of the capacity and balance searches
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub capacity_step: Decimal,
    pub balance_step: Decimal,
    pub tolerance: Decimal,
    pub max_iterations: usize,
    pub max_scan_iterations: usize,
}

/// Inclusive price sweep `start, start + step, ..., <= end`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AxisConfig {
    pub start: Decimal,
    pub end: Decimal,
    pub step: Decimal,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            price_now: defaults::market::PRICE_NOW,
            range_lower: defaults::market::RANGE_LOWER,
            range_upper: defaults::market::RANGE_UPPER,
        }
    }
}

impl Default for HedgeLegConfig {
    fn default() -> Self {
        Self {
            total_budget: defaults::hedge::TOTAL_BUDGET,
            short_reference_price: defaults::hedge::SHORT_REFERENCE_PRICE,
            target_price: None,
            leverage: defaults::hedge::LEVERAGE,
            amm_scale: defaults::hedge::AMM_SCALE,
            short_scale: defaults::hedge::SHORT_SCALE,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            capacity_step: defaults::search::CAPACITY_STEP,
            balance_step: defaults::search::BALANCE_STEP,
            tolerance: defaults::search::TOLERANCE,
            max_iterations: defaults::search::MAX_ITERATIONS,
            max_scan_iterations: defaults::search::MAX_SCAN_ITERATIONS,
        }
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            start: defaults::axis::START,
            end: defaults::axis::END,
            step: defaults::axis::STEP,
        }
    }
}

impl AxisConfig {
    /// Expand into the price sequence; empty when the step is not positive
    pub fn prices(&self) -> Vec<Decimal> {
        let mut prices = Vec::new();
        if self.step <= Decimal::ZERO {
            return prices;
        }

        let mut price = self.start;
        while price <= self.end {
            prices.push(price);
            price += self.step;
        }
        prices
    }
}

impl HedgeConfig {
    /// Load configuration from a TOML file with `HEDGE_` environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_prefix(path, defaults::ENV_PREFIX)
    }

    /// Load configuration with a custom environment variable prefix
    ///
    /// Nested keys use a double underscore: `{prefix}_HEDGE__LEVERAGE=2`.
    pub fn load_with_prefix(path: &Path, prefix: &str) -> Result<Self> {
        info!("Loading hedge config: {:?}", path);

        let builder = Config::builder()
            .add_source(File::from(path).required(true))
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::finish(builder.build().context("Failed to build configuration")?)
    }

    /// Parse an inline TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .context("Failed to parse TOML configuration")?;

        Self::finish(config)
    }

    /// Render as TOML, e.g. to seed a config file
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Reject parameters no computation can use
    pub fn validate(&self) -> Result<()> {
        let market = &self.market;
        ensure!(
            market.price_now > Decimal::ZERO,
            "price_now must be positive, got {}",
            market.price_now
        );
        ensure!(
            market.range_lower > Decimal::ZERO && market.range_lower < market.range_upper,
            "range must satisfy 0 < lower < upper, got [{}, {}]",
            market.range_lower,
            market.range_upper
        );

        let hedge = &self.hedge;
        ensure!(
            hedge.short_reference_price > Decimal::ZERO,
            "short_reference_price must be positive, got {}",
            hedge.short_reference_price
        );
        if let Some(target) = hedge.target_price {
            ensure!(target > Decimal::ZERO, "target_price must be positive, got {}", target);
        }
        ensure!(
            hedge.leverage >= Decimal::ZERO,
            "leverage must not be negative, got {}",
            hedge.leverage
        );
        ensure!(
            hedge.amm_scale >= Decimal::ZERO && hedge.short_scale >= Decimal::ZERO,
            "split scales must not be negative"
        );

        let search = &self.search;
        ensure!(search.capacity_step > Decimal::ZERO, "capacity_step must be positive");
        ensure!(search.balance_step > Decimal::ZERO, "balance_step must be positive");
        ensure!(search.tolerance >= Decimal::ZERO, "tolerance must not be negative");
        ensure!(search.max_iterations > 0, "max_iterations must be positive");
        ensure!(
            search.max_scan_iterations > 0,
            "max_scan_iterations must be positive"
        );

        let axis = &self.axis;
        ensure!(axis.step > Decimal::ZERO, "axis step must be positive");
        ensure!(axis.start > Decimal::ZERO, "axis prices must be positive");
        ensure!(
            axis.start <= axis.end,
            "axis start {} is past its end {}",
            axis.start,
            axis.end
        );

        Ok(())
    }

    fn finish(config: Config) -> Result<Self> {
        let parsed: Self = config
            .try_deserialize()
            .context("Failed to deserialize hedge configuration")?;
        parsed.validate().context("Invalid hedge configuration")?;

        debug!(?parsed, "hedge configuration loaded");
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_reference_chart() {
        let config = HedgeConfig::default();
        assert_eq!(config.market.price_now, dec!(1000));
        assert_eq!(config.market.range_lower, dec!(900));
        assert_eq!(config.market.range_upper, dec!(1100));
        assert_eq!(config.hedge.total_budget, dec!(1000));
        assert_eq!(config.hedge.target_price, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_axis_expansion_is_inclusive() {
        let prices = AxisConfig::default().prices();
        assert_eq!(prices.len(), 1001);
        assert_eq!(prices.first(), Some(&dec!(500)));
        assert_eq!(prices.last(), Some(&dec!(1500)));

        let bad = AxisConfig {
            step: dec!(0),
            ..AxisConfig::default()
        };
        assert!(bad.prices().is_empty());
    }

    #[test]
    fn test_load_base_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("hedge.toml");

        let config_content = r#"
[market]
price_now = 2000
range_lower = 1800
range_upper = 2200

[hedge]
total_budget = 5000
target_price = 1850
leverage = 2

[search]
tolerance = 0.5
max_scan_iterations = 5000
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = HedgeConfig::load(&config_path).unwrap();

        assert_eq!(config.market.price_now, dec!(2000));
        assert_eq!(config.market.range_upper, dec!(2200));
        assert_eq!(config.hedge.total_budget, dec!(5000));
        assert_eq!(config.hedge.target_price, Some(dec!(1850)));
        assert_eq!(config.hedge.leverage, dec!(2));
        assert_eq!(config.search.tolerance, dec!(0.5));
        assert_eq!(config.search.max_scan_iterations, 5000);

        // Untouched keys keep their defaults
        assert_eq!(config.hedge.amm_scale, dec!(1.25));
        assert_eq!(config.search.balance_step, dec!(0.1));
        assert_eq!(config.axis, AxisConfig::default());
    }

    #[test]
    fn test_environment_override() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("hedge.toml");
        fs::write(&config_path, "[hedge]\nleverage = 1\n").unwrap();

        std::env::set_var("HEDGECFGTEST_HEDGE__LEVERAGE", "3");
        let config = HedgeConfig::load_with_prefix(&config_path, "HEDGECFGTEST").unwrap();
        std::env::remove_var("HEDGECFGTEST_HEDGE__LEVERAGE");

        assert_eq!(config.hedge.leverage, dec!(3));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        assert!(HedgeConfig::load(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = HedgeConfig::from_toml_str("[market]\nrange_lower = 1100\nrange_upper = 900\n")
            .unwrap_err();
        assert!(format!("{:#}", err).contains("range must satisfy"));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = HedgeConfig::default();
        config.hedge.target_price = Some(dec!(920));
        config.axis.step = dec!(5);

        let rendered = config.to_toml_string().unwrap();
        let parsed = HedgeConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
