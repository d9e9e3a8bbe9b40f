//! Equal-PNL capital split between an AMM leg and a short leg
//!
//! Walks the AMM share of a budget upward in fixed steps. Each candidate is
//! sized into a concentrated position, moved to the target price, and its
//! PNL compared with the PNL of shorting the remainder. The first candidate
//! whose legs cancel within tolerance is the split. When the imbalance
//! changes sign between two candidates without either meeting the
//! tolerance, the bracket is bisected before the walk continues.

use hedge_amm::{
    CapacityConfig, CapacitySearch, HedgeError, LiquidityMath, Market, PositionSimulator,
    PriceRange, Result,
};
use hedge_config::SearchConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Halvings spent on one sign-change bracket before the walk moves on
const MAX_BISECTION_ROUNDS: usize = 96;

/// Capital assigned to each leg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HedgeSplit {
    pub amm_capital: Decimal,
    pub short_capital: Decimal,
}

impl HedgeSplit {
    pub fn total(&self) -> Decimal {
        self.amm_capital + self.short_capital
    }
}

/// Rescaling applied to a discovered split before it is charted
///
/// The default factors (AMM ×1.25, short ×0.75) are an empirical tuning, not
/// derived from the equal-PNL condition. Use [`SplitAdjustment::identity`]
/// to chart the raw split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitAdjustment {
    pub amm_scale: Decimal,
    pub short_scale: Decimal,
}

impl Default for SplitAdjustment {
    fn default() -> Self {
        Self {
            amm_scale: dec!(1.25),
            short_scale: dec!(0.75),
        }
    }
}

impl SplitAdjustment {
    pub fn identity() -> Self {
        Self {
            amm_scale: Decimal::ONE,
            short_scale: Decimal::ONE,
        }
    }

    pub fn apply(&self, split: &HedgeSplit) -> HedgeSplit {
        HedgeSplit {
            amm_capital: split.amm_capital * self.amm_scale,
            short_capital: split.short_capital * self.short_scale,
        }
    }
}

/// Configuration for the equal-PNL search
#[derive(Debug, Clone)]
pub struct BalancerConfig {
    /// Increment of the AMM budget between candidates
    pub step: Decimal,
    /// Largest `|PNL_amm + PNL_short|` accepted as a match
    pub tolerance: Decimal,
    /// Candidate cap; the step widens to `budget / max_iterations` beyond it
    pub max_iterations: usize,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            step: dec!(0.1),
            tolerance: dec!(0.1),
            max_iterations: 20_000,
        }
    }
}

/// Finds the capital split whose legs' PNLs cancel at a target price
#[derive(Debug, Clone, Default)]
pub struct HedgeBalancer {
    config: BalancerConfig,
    capacity: CapacitySearch,
}

impl HedgeBalancer {
    pub fn new(config: BalancerConfig, capacity: CapacitySearch) -> Self {
        Self { config, capacity }
    }

    pub fn from_config(search: &SearchConfig) -> Self {
        Self::new(
            BalancerConfig {
                step: search.balance_step,
                tolerance: search.tolerance,
                max_iterations: search.max_iterations,
            },
            CapacitySearch::new(CapacityConfig {
                step: search.capacity_step,
                max_scan_iterations: search.max_scan_iterations,
            }),
        )
    }

    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    pub fn capacity(&self) -> &CapacitySearch {
        &self.capacity
    }

    /// Split of `total_budget` whose AMM and short PNLs cancel at `target_price`
    ///
    /// `Ok(None)` means no candidate in `[0, total_budget]` met the tolerance;
    /// it is never reported as a zero split.
    pub fn find_equal_pnl_split(
        &self,
        price_now: Decimal,
        range: &PriceRange,
        target_price: Decimal,
        short_reference_price: Decimal,
        total_budget: Decimal,
    ) -> Result<Option<HedgeSplit>> {
        if total_budget <= Decimal::ZERO {
            return Err(HedgeError::NonPositiveBudget {
                budget: total_budget,
            });
        }
        if self.config.tolerance < Decimal::ZERO {
            return Err(HedgeError::NegativeAmount {
                context: "balance tolerance",
                amount: self.config.tolerance,
            });
        }

        let market = Market::new(price_now, *range)?;
        let sqrt_target = LiquidityMath::sqrt_price(target_price, "balance target price")?;
        let step = self.effective_step(total_budget)?;

        let imbalance_at = |amm_budget: Decimal| -> Result<Decimal> {
            let amm_pnl = self.amm_pnl_in(&market, sqrt_target, target_price, amm_budget)?;
            let short_capital = total_budget - amm_budget;
            let short_pnl = Self::short_pnl(short_capital, short_reference_price, target_price)?;
            trace!(%amm_budget, %amm_pnl, %short_pnl, "balance candidate");
            amm_pnl
                .checked_add(short_pnl)
                .ok_or(HedgeError::Overflow { context: "PNL imbalance" })
        };

        let mut previous: Option<(Decimal, Decimal)> = None;
        let mut amm_budget = Decimal::ZERO;
        while amm_budget <= total_budget {
            let imbalance = imbalance_at(amm_budget)?;

            if imbalance.abs() <= self.config.tolerance {
                return Ok(Some(Self::found(amm_budget, total_budget, imbalance)));
            }

            if let Some((prev_budget, prev_imbalance)) = previous {
                if prev_imbalance.is_sign_negative() != imbalance.is_sign_negative() {
                    let bracket = ((prev_budget, prev_imbalance), (amm_budget, imbalance));
                    if let Some((budget, residual)) = self.bisect(bracket, &imbalance_at)? {
                        return Ok(Some(Self::found(budget, total_budget, residual)));
                    }
                }
            }

            previous = Some((amm_budget, imbalance));
            amm_budget = match amm_budget.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }

        warn!(
            %price_now,
            %target_price,
            %total_budget,
            "no equal-PNL split within budget"
        );
        Ok(None)
    }

    /// Narrow a sign-change bracket until the imbalance meets the tolerance
    ///
    /// `None` when the bracket collapses onto a jump wider than the tolerance.
    fn bisect<F>(
        &self,
        bracket: ((Decimal, Decimal), (Decimal, Decimal)),
        imbalance_at: &F,
    ) -> Result<Option<(Decimal, Decimal)>>
    where
        F: Fn(Decimal) -> Result<Decimal>,
    {
        let ((mut lo, mut lo_imbalance), (mut hi, mut hi_imbalance)) = bracket;

        for _ in 0..MAX_BISECTION_ROUNDS {
            let mid = lo + (hi - lo) / dec!(2);
            if mid == lo || mid == hi {
                break;
            }

            let imbalance = imbalance_at(mid)?;
            if imbalance.abs() <= self.config.tolerance {
                return Ok(Some((mid, imbalance)));
            }
            if imbalance.is_sign_negative() == lo_imbalance.is_sign_negative() {
                lo = mid;
                lo_imbalance = imbalance;
            } else {
                hi = mid;
                hi_imbalance = imbalance;
            }
        }

        let closest = if lo_imbalance.abs() <= hi_imbalance.abs() {
            (lo, lo_imbalance)
        } else {
            (hi, hi_imbalance)
        };
        if closest.1.abs() <= self.config.tolerance {
            return Ok(Some(closest));
        }

        debug!(%lo, %hi, "sign change without a split inside tolerance");
        Ok(None)
    }

    fn found(amm_capital: Decimal, total_budget: Decimal, imbalance: Decimal) -> HedgeSplit {
        let short_capital = total_budget - amm_capital;
        debug!(
            %amm_capital,
            %short_capital,
            %imbalance,
            "equal-PNL split found"
        );
        HedgeSplit {
            amm_capital,
            short_capital,
        }
    }

    /// PNL of an AMM leg worth `amm_budget` at `price_now` when the price moves to `target_price`
    pub fn amm_pnl(
        &self,
        price_now: Decimal,
        range: &PriceRange,
        amm_budget: Decimal,
        target_price: Decimal,
    ) -> Result<Decimal> {
        let market = Market::new(price_now, *range)?;
        let sqrt_target = LiquidityMath::sqrt_price(target_price, "PNL target price")?;
        self.amm_pnl_in(&market, sqrt_target, target_price, amm_budget)
    }

    /// PNL of shorting `short_capital` opened at `reference_price`, marked at `price`
    pub fn short_pnl(
        short_capital: Decimal,
        reference_price: Decimal,
        price: Decimal,
    ) -> Result<Decimal> {
        if reference_price <= Decimal::ZERO {
            return Err(HedgeError::NonPositivePrice {
                context: "short reference price",
                price: reference_price,
            });
        }
        reference_price
            .checked_sub(price)
            .and_then(|change| change.checked_div(reference_price))
            .and_then(|ratio| short_capital.checked_mul(ratio))
            .ok_or(HedgeError::Overflow {
                context: "short PNL",
            })
    }

    fn amm_pnl_in(
        &self,
        market: &Market,
        sqrt_target: Decimal,
        target_price: Decimal,
        amm_budget: Decimal,
    ) -> Result<Decimal> {
        let position = self.capacity.position_for_budget(market, amm_budget)?;
        let moved = PositionSimulator::rebalance_sqrt(&position, sqrt_target)?;
        Ok(moved.value_at(target_price)? - position.value()?)
    }

    fn effective_step(&self, total_budget: Decimal) -> Result<Decimal> {
        if self.config.step <= Decimal::ZERO {
            return Err(HedgeError::NegativeAmount {
                context: "balance step",
                amount: self.config.step,
            });
        }

        let floor = total_budget / Decimal::from(self.config.max_iterations.max(1));
        if self.config.step < floor {
            debug!(
                configured = %self.config.step,
                widened = %floor,
                "balance step widened to respect the iteration cap"
            );
            return Ok(floor);
        }
        Ok(self.config.step)
    }
}
