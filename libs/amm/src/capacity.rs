//! Position sizing against a value budget
//!
//! Finds the largest token X amount, on a fixed step grid, whose in-range
//! position is still worth less than a target at the spot price. Value grows
//! monotonically with `x`, so the grid point can be located by bisection over
//! the step index; the linear scan is kept as the reference behaviour.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, trace};

use crate::error::{add, div, mul, HedgeError, Result};
use crate::liquidity_math::LiquidityMath;
use crate::position::{Market, Position, PriceRange, Reserves};

/// Configuration for capacity searches
#[derive(Debug, Clone)]
pub struct CapacityConfig {
    /// Grid spacing for token X amounts
    pub step: Decimal,
    /// Iteration cap for the linear reference scan
    pub max_scan_iterations: usize,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            step: dec!(0.001),
            max_scan_iterations: 1_000_000,
        }
    }
}

/// Sizes AMM positions so their value fits a budget
#[derive(Debug, Clone, Default)]
pub struct CapacitySearch {
    config: CapacityConfig,
}

impl CapacitySearch {
    pub fn new(config: CapacityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CapacityConfig {
        &self.config
    }

    /// Largest grid `x` whose position value at `price_now` stays below `target`
    ///
    /// Returns zero when even the first grid step reaches the target.
    pub fn max_x_for_value(
        &self,
        price_now: Decimal,
        range: &PriceRange,
        target: Decimal,
    ) -> Result<Decimal> {
        let market = Market::new(price_now, *range)?;
        self.max_x_in(&market, target)
    }

    /// [`Self::max_x_for_value`] in an already prepared market
    pub fn max_x_in(&self, market: &Market, target: Decimal) -> Result<Decimal> {
        let step = self.checked_step()?;
        Self::check_target(target)?;

        let at = |k: u64| {
            let x = mul(step, Decimal::from(k), "capacity grid point")?;
            Self::value_for_x(market, x)
        };

        if at(1)? >= target {
            return Ok(Decimal::ZERO);
        }

        // value(x) >= x * price, so this index is guaranteed to reach the target
        let value_per_step = mul(market.price, step, "capacity step value")?;
        let upper_index = div(target, value_per_step, "capacity upper index")?.ceil() + Decimal::ONE;
        let mut hi = upper_index
            .to_u64()
            .ok_or(HedgeError::ScanExhausted {
                iterations: usize::MAX,
            })?
            .max(2);
        let mut lo = 1u64;

        while at(hi)? < target {
            if hi == u64::MAX {
                return Err(HedgeError::ScanExhausted {
                    iterations: usize::MAX,
                });
            }
            lo = hi;
            hi = hi.saturating_mul(2);
        }

        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if at(mid)? >= target {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let x = mul(step, Decimal::from(lo), "capacity grid point")?;
        trace!(%target, %x, "capacity bisection settled");
        Ok(x)
    }

    /// Reference forward scan: step `x` up until the value reaches `target`
    ///
    /// Bounded by `max_scan_iterations`; running out is a
    /// [`HedgeError::ScanExhausted`].
    pub fn scan_max_x_for_value(
        &self,
        price_now: Decimal,
        range: &PriceRange,
        target: Decimal,
    ) -> Result<Decimal> {
        let market = Market::new(price_now, *range)?;
        let step = self.checked_step()?;
        Self::check_target(target)?;

        let mut x = step;
        for _ in 0..self.config.max_scan_iterations {
            if Self::value_for_x(&market, x)? >= target {
                return Ok(x - step);
            }
            x = add(x, step, "capacity scan")?;
        }

        Err(HedgeError::ScanExhausted {
            iterations: self.config.max_scan_iterations,
        })
    }

    /// Value at the spot price of the in-range position built from `x`
    ///
    /// Liquidity is taken from token X alone over `[max(√P, √a), √b]`; the Y
    /// side is whatever that liquidity holds at the spot price.
    pub fn value_for_x(market: &Market, x: Decimal) -> Result<Decimal> {
        if market.sqrt_price >= market.bounds.sqrt_upper {
            return Err(HedgeError::PriceAboveRange {
                price: market.price,
                upper: market.range.upper,
            });
        }

        let sqrt_from = market.sqrt_price.max(market.bounds.sqrt_lower);
        let liquidity = LiquidityMath::liquidity_from_x(x, sqrt_from, market.bounds.sqrt_upper)?;
        let y = mul(liquidity, sqrt_from - market.bounds.sqrt_lower, "capacity Y side")?;

        add(mul(x, market.price, "capacity X value")?, y, "capacity value")
    }

    /// AMM leg worth `budget` at the spot price
    ///
    /// Holds the capacity `x` plus the remaining budget in token Y; a zero
    /// budget gives the empty position.
    pub fn position_for_budget(&self, market: &Market, budget: Decimal) -> Result<Position> {
        if budget < Decimal::ZERO {
            return Err(HedgeError::NegativeAmount {
                context: "AMM budget",
                amount: budget,
            });
        }
        if budget.is_zero() {
            return Position::open(Reserves::default(), market);
        }

        let x = self.max_x_in(market, budget)?;
        let y = budget - mul(x, market.price, "AMM leg X value")?;
        let position = Position::open(Reserves::new(x, y)?, market)?;

        debug!(
            %budget,
            %x,
            %y,
            liquidity = %position.liquidity(),
            "sized AMM position"
        );
        Ok(position)
    }

    fn checked_step(&self) -> Result<Decimal> {
        if self.config.step <= Decimal::ZERO {
            return Err(HedgeError::NegativeAmount {
                context: "capacity step",
                amount: self.config.step,
            });
        }
        Ok(self.config.step)
    }

    fn check_target(target: Decimal) -> Result<()> {
        if target <= Decimal::ZERO {
            return Err(HedgeError::NonPositiveTarget { target });
        }
        Ok(())
    }
}
