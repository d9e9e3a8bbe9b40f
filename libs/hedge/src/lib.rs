//! # Hedge Strategy - Equal-PNL Hedging of Concentrated Liquidity
//!
//! ## Purpose
//!
//! Pairs a concentrated liquidity (AMM) position with a short position and
//! finds how to split capital between them so that both legs' PNLs cancel
//! at a chosen price. The resulting hedge is then swept across a price axis
//! to produce the value curves a chart or report consumes.
//!
//! ## Flow
//!
//! `CurveGenerator` → `HedgeBalancer` → `CapacitySearch` → `PositionSimulator`
//! → `LiquidityMath`; each layer calls down and returns scalars or small
//! value types. Nothing is cached between calls.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hedge_config::HedgeConfig;
//! use hedge_strategy::{CurveGenerator, CurveParams};
//!
//! let config = HedgeConfig::default();
//! let params = CurveParams::from_config(&config).unwrap();
//! let curve = CurveGenerator::from_config(&config).generate(&params).unwrap();
//!
//! for (price, unhedged, hedged) in curve.points() {
//!     println!("{price}: {unhedged} -> {hedged}");
//! }
//! ```

pub mod balancer;
pub mod curve;

pub use balancer::{BalancerConfig, HedgeBalancer, HedgeSplit, SplitAdjustment};
pub use curve::{Curve, CurveGenerator, CurveParams, CurveVolatility};
pub use hedge_amm::{HedgeError, PriceRange, Result};
