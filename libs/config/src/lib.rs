//! # Hedge Configuration
//!
//! Configuration loading and default constants for hedge curve
//! computations. The engine crates take explicit parameters only; this
//! crate is where a host turns files and environment variables into them.
//!
//! ## Features
//!
//! - **Defaults**: the reference market, hedge, search and axis values
//! - **Loading**: TOML files layered under `HEDGE_` environment variables
//! - **Validation**: rejects geometry and steps no computation can use
//!
//! ## Usage
//!
//! ```rust
//! use hedge_config::HedgeConfig;
//!
//! let config = HedgeConfig::from_toml_str("[hedge]\nleverage = 2\n").unwrap();
//! assert_eq!(config.axis.prices().len(), 1001);
//! ```

pub mod defaults;
pub mod hedge_config;

// Re-export commonly used types
pub use hedge_config::{AxisConfig, HedgeConfig, HedgeLegConfig, MarketConfig, SearchConfig};
