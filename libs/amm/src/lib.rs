//! # Hedge AMM Library - Concentrated Liquidity Mathematics
//!
//! ## Purpose
//!
//! Exact `Decimal` arithmetic for concentrated liquidity positions: turning a
//! price range and reserve amounts into a liquidity constant, moving that
//! liquidity to other prices, and sizing a position so it fits a value
//! budget. The hedge strategy crate builds its equal-PNL search and curve
//! sweep on top of these primitives.
//!
//! ## Layers
//!
//! - [`LiquidityMath`]: reserve <-> liquidity conversions in square-root-price space
//! - [`PositionSimulator`]: rebalances a [`Position`] to a new price and values it
//! - [`CapacitySearch`]: largest position worth less than a target value
//!
//! ## Usage
//!
//! ```rust
//! use hedge_amm::{dec, CapacitySearch, PositionSimulator, PriceRange};
//! use hedge_amm::position::Market;
//!
//! let range = PriceRange::new(dec!(900), dec!(1100)).unwrap();
//! let market = Market::new(dec!(1000), range).unwrap();
//!
//! let position = CapacitySearch::default()
//!     .position_for_budget(&market, dec!(500))
//!     .unwrap();
//! let pnl = PositionSimulator::pnl(&position, dec!(950)).unwrap();
//! assert!(pnl < dec!(0));
//! ```
//!
//! ## Errors
//!
//! Invalid geometry, non-positive prices or targets and zero-width spans are
//! reported as [`HedgeError`]; no operation returns NaN-like sentinels.
//! Arithmetic is checked, so values outside the `Decimal` range come back as
//! [`HedgeError::Overflow`] rather than a panic.

pub mod capacity;
pub mod error;
pub mod liquidity_math;
pub mod position;

pub use capacity::{CapacityConfig, CapacitySearch};
pub use error::{HedgeError, Result};
pub use liquidity_math::LiquidityMath;
pub use position::{Market, Position, PositionSimulator, PriceRange, Reserves, SqrtBounds};

/// Common types for AMM calculations
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
