//! Concentrated liquidity positions and their rebalancing
//!
//! A [`Position`] fixes its liquidity at the price it was opened at. Moving
//! the price never changes `L`; [`PositionSimulator`] derives the new
//! reserve pair from it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{add, div, mul, HedgeError, Result};
use crate::liquidity_math::LiquidityMath;

/// Price bounds of a concentrated position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub lower: Decimal,
    pub upper: Decimal,
}

impl PriceRange {
    /// Build a range, rejecting non-positive or inverted bounds
    pub fn new(lower: Decimal, upper: Decimal) -> Result<Self> {
        let range = Self { lower, upper };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lower <= Decimal::ZERO || self.lower >= self.upper {
            return Err(HedgeError::InvalidRange {
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(())
    }

    /// True when `price` lies strictly between the bounds
    pub fn contains(&self, price: Decimal) -> bool {
        self.lower < price && price < self.upper
    }

    pub fn sqrt_bounds(&self) -> Result<SqrtBounds> {
        self.validate()?;
        Ok(SqrtBounds {
            sqrt_lower: LiquidityMath::sqrt_price(self.lower, "range lower bound")?,
            sqrt_upper: LiquidityMath::sqrt_price(self.upper, "range upper bound")?,
        })
    }
}

/// Square roots of a range's bounds, computed once per position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtBounds {
    pub sqrt_lower: Decimal,
    pub sqrt_upper: Decimal,
}

impl SqrtBounds {
    pub fn clamp(&self, sqrt_price: Decimal) -> Decimal {
        sqrt_price.max(self.sqrt_lower).min(self.sqrt_upper)
    }
}

/// Spot price and range together with the square roots the math runs on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Market {
    pub price: Decimal,
    pub sqrt_price: Decimal,
    pub range: PriceRange,
    pub bounds: SqrtBounds,
}

impl Market {
    pub fn new(price: Decimal, range: PriceRange) -> Result<Self> {
        Ok(Self {
            price,
            sqrt_price: LiquidityMath::sqrt_price(price, "spot price")?,
            range,
            bounds: range.sqrt_bounds()?,
        })
    }
}

/// Token amounts held by a position at some price
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Reserves {
    pub x: Decimal,
    pub y: Decimal,
}

impl Reserves {
    pub fn new(x: Decimal, y: Decimal) -> Result<Self> {
        if x < Decimal::ZERO {
            return Err(HedgeError::NegativeAmount {
                context: "token X reserve",
                amount: x,
            });
        }
        if y < Decimal::ZERO {
            return Err(HedgeError::NegativeAmount {
                context: "token Y reserve",
                amount: y,
            });
        }
        Ok(Self { x, y })
    }

    /// Value in token Y terms: `x * price + y`
    pub fn value_at(&self, price: Decimal) -> Result<Decimal> {
        PositionSimulator::value_at(self.x, self.y, price)
    }
}

/// Liquidity position opened at `price`
///
/// `liquidity` is derived once from the reserves, range and opening price
/// and cached; rebalancing reads it and never rewrites it.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    reserves: Reserves,
    range: PriceRange,
    liquidity: Decimal,
    price: Decimal,
    sqrt_price: Decimal,
    bounds: SqrtBounds,
}

impl Position {
    /// Open a position holding `reserves` at `price`
    pub fn new(reserves: Reserves, range: PriceRange, price: Decimal) -> Result<Self> {
        Self::open(reserves, &Market::new(price, range)?)
    }

    /// Open a position holding `reserves` in an already prepared market
    pub fn open(reserves: Reserves, market: &Market) -> Result<Self> {
        let reserves = Reserves::new(reserves.x, reserves.y)?;
        let liquidity = LiquidityMath::liquidity_at(
            reserves.x,
            reserves.y,
            market.sqrt_price,
            market.bounds.sqrt_lower,
            market.bounds.sqrt_upper,
        )?;

        Ok(Self {
            reserves,
            range: market.range,
            liquidity,
            price: market.price,
            sqrt_price: market.sqrt_price,
            bounds: market.bounds,
        })
    }

    /// Open a position that carries exactly `liquidity`, with no idle reserve
    pub fn from_liquidity(liquidity: Decimal, range: PriceRange, price: Decimal) -> Result<Self> {
        let bounds = range.sqrt_bounds()?;
        let sqrt_price = LiquidityMath::sqrt_price(price, "position opening price")?;
        let (x, y) =
            LiquidityMath::reserves_at(liquidity, sqrt_price, bounds.sqrt_lower, bounds.sqrt_upper)?;

        Ok(Self {
            reserves: Reserves { x, y },
            range,
            liquidity,
            price,
            sqrt_price,
            bounds,
        })
    }

    /// Position holding nothing
    pub fn empty(range: PriceRange, price: Decimal) -> Result<Self> {
        Self::new(Reserves::default(), range, price)
    }

    pub fn reserves(&self) -> Reserves {
        self.reserves
    }

    pub fn range(&self) -> PriceRange {
        self.range
    }

    pub fn liquidity(&self) -> Decimal {
        self.liquidity
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn sqrt_bounds(&self) -> SqrtBounds {
        self.bounds
    }

    /// Value at the opening price
    pub fn value(&self) -> Result<Decimal> {
        self.reserves.value_at(self.price)
    }
}

/// Moves positions to new prices
pub struct PositionSimulator;

impl PositionSimulator {
    /// Reserves after the price moves from the opening price to `new_price`
    ///
    /// Applies the incremental form `x + L * Δ(1/√P)`, `y + L * Δ√P` with both
    /// square-root prices clamped into the range, so reserve that did not bind
    /// the liquidity is carried along unchanged.
    pub fn rebalance(position: &Position, new_price: Decimal) -> Result<Reserves> {
        let sqrt_new = LiquidityMath::sqrt_price(new_price, "rebalance price")?;
        Self::rebalance_sqrt(position, sqrt_new)
    }

    /// [`Self::rebalance`] for a square-root price that is already validated
    pub fn rebalance_sqrt(position: &Position, sqrt_new: Decimal) -> Result<Reserves> {
        let bounds = position.bounds;
        let from = bounds.clamp(position.sqrt_price);
        let to = bounds.clamp(sqrt_new);

        if from == to {
            return Ok(position.reserves);
        }

        let liquidity = position.liquidity;
        let delta_inv_sqrt = div(Decimal::ONE, to, "rebalance")? - div(Decimal::ONE, from, "rebalance")?;
        let delta_x = mul(delta_inv_sqrt, liquidity, "rebalance token X")?;
        let delta_y = mul(to - from, liquidity, "rebalance token Y")?;

        // Rounding at the bounds can leave a residue a few ulps below zero
        Ok(Reserves {
            x: add(position.reserves.x, delta_x, "rebalance token X")?.max(Decimal::ZERO),
            y: add(position.reserves.y, delta_y, "rebalance token Y")?.max(Decimal::ZERO),
        })
    }

    /// Reserves the cached liquidity alone would hold at `new_price`
    pub fn reserves_at(position: &Position, new_price: Decimal) -> Result<Reserves> {
        let sqrt_new = LiquidityMath::sqrt_price(new_price, "rebalance price")?;
        let (x, y) = LiquidityMath::reserves_at(
            position.liquidity,
            sqrt_new,
            position.bounds.sqrt_lower,
            position.bounds.sqrt_upper,
        )?;
        Ok(Reserves { x, y })
    }

    pub fn value_at(x: Decimal, y: Decimal, price: Decimal) -> Result<Decimal> {
        add(mul(x, price, "position value")?, y, "position value")
    }

    /// Value change from the opening price to `new_price`
    pub fn pnl(position: &Position, new_price: Decimal) -> Result<Decimal> {
        let moved = Self::rebalance(position, new_price)?;
        Ok(moved.value_at(new_price)? - position.value()?)
    }
}
