//! Concentrated liquidity math in square-root-price space
//!
//! Converts between token reserves and the liquidity constant `L` of a
//! position bounded by `[sqrt_a, sqrt_b]`. Token X is the base asset priced
//! in token Y; a position below its range holds only X, above only Y.
//! All calculations stay in `Decimal` so results are reproducible.

use rust_decimal::{Decimal, MathematicalOps};

use crate::error::{div, mul, HedgeError, Result};

/// Liquidity <-> reserve conversions for a single bounded position
pub struct LiquidityMath;

impl LiquidityMath {
    /// Square root of a strictly positive price
    pub fn sqrt_price(price: Decimal, context: &'static str) -> Result<Decimal> {
        if price <= Decimal::ZERO {
            return Err(HedgeError::NonPositivePrice { context, price });
        }
        price
            .sqrt()
            .ok_or(HedgeError::NonPositivePrice { context, price })
    }

    /// Liquidity carried by `x` units of token X across `[sqrt_a, sqrt_b]`
    ///
    /// `L = x * sqrt_a * sqrt_b / (sqrt_b - sqrt_a)`
    pub fn liquidity_from_x(x: Decimal, sqrt_a: Decimal, sqrt_b: Decimal) -> Result<Decimal> {
        Self::check_span(sqrt_a, sqrt_b, "liquidity_from_x")?;
        Self::check_amount(x, "token X reserve")?;

        let numerator = mul(mul(x, sqrt_a, "liquidity_from_x")?, sqrt_b, "liquidity_from_x")?;
        div(numerator, sqrt_b - sqrt_a, "liquidity_from_x")
    }

    /// Liquidity carried by `y` units of token Y across `[sqrt_a, sqrt_b]`
    ///
    /// `L = y / (sqrt_b - sqrt_a)`
    pub fn liquidity_from_y(y: Decimal, sqrt_a: Decimal, sqrt_b: Decimal) -> Result<Decimal> {
        Self::check_span(sqrt_a, sqrt_b, "liquidity_from_y")?;
        Self::check_amount(y, "token Y reserve")?;

        div(y, sqrt_b - sqrt_a, "liquidity_from_y")
    }

    /// Liquidity of a position holding `(x, y)` at `sqrt_p`
    ///
    /// Three regions:
    /// - at or below the range only X counts, over the full span
    /// - inside the range each token bounds `L` over its side of the current
    ///   price and the scarcer one wins
    /// - at or above the range only Y counts, over the full span
    pub fn liquidity_at(
        x: Decimal,
        y: Decimal,
        sqrt_p: Decimal,
        sqrt_a: Decimal,
        sqrt_b: Decimal,
    ) -> Result<Decimal> {
        Self::check_span(sqrt_a, sqrt_b, "liquidity_at")?;
        Self::check_sqrt_price(sqrt_p)?;

        if sqrt_p <= sqrt_a {
            Self::liquidity_from_x(x, sqrt_a, sqrt_b)
        } else if sqrt_p < sqrt_b {
            let from_x = Self::liquidity_from_x(x, sqrt_p, sqrt_b)?;
            let from_y = Self::liquidity_from_y(y, sqrt_a, sqrt_p)?;
            Ok(from_x.min(from_y))
        } else {
            Self::liquidity_from_y(y, sqrt_a, sqrt_b)
        }
    }

    /// Reserves `(x, y)` held by liquidity `L` at `sqrt_p`
    ///
    /// Outside the range the composition is that of the nearest bound, so
    /// `sqrt_p` is clamped into `[sqrt_a, sqrt_b]` first.
    pub fn reserves_at(
        liquidity: Decimal,
        sqrt_p: Decimal,
        sqrt_a: Decimal,
        sqrt_b: Decimal,
    ) -> Result<(Decimal, Decimal)> {
        Self::check_span(sqrt_a, sqrt_b, "reserves_at")?;
        Self::check_sqrt_price(sqrt_p)?;
        Self::check_amount(liquidity, "liquidity")?;

        let clamped = sqrt_p.max(sqrt_a).min(sqrt_b);
        let x = div(
            mul(liquidity, sqrt_b - clamped, "reserves_at")?,
            mul(clamped, sqrt_b, "reserves_at")?,
            "reserves_at",
        )?;
        let y = mul(liquidity, clamped - sqrt_a, "reserves_at")?;

        Ok((x, y))
    }

    fn check_span(sqrt_a: Decimal, sqrt_b: Decimal, context: &'static str) -> Result<()> {
        if sqrt_a <= Decimal::ZERO {
            return Err(HedgeError::NonPositivePrice {
                context: "sqrt lower bound",
                price: sqrt_a,
            });
        }
        if sqrt_b <= Decimal::ZERO {
            return Err(HedgeError::NonPositivePrice {
                context: "sqrt upper bound",
                price: sqrt_b,
            });
        }
        if sqrt_a == sqrt_b {
            return Err(HedgeError::ZeroSpan { context });
        }
        if sqrt_a > sqrt_b {
            return Err(HedgeError::InvalidRange {
                lower: sqrt_a,
                upper: sqrt_b,
            });
        }
        Ok(())
    }

    fn check_sqrt_price(sqrt_p: Decimal) -> Result<()> {
        if sqrt_p <= Decimal::ZERO {
            return Err(HedgeError::NonPositivePrice {
                context: "sqrt spot price",
                price: sqrt_p,
            });
        }
        Ok(())
    }

    fn check_amount(amount: Decimal, context: &'static str) -> Result<()> {
        if amount < Decimal::ZERO {
            return Err(HedgeError::NegativeAmount { context, amount });
        }
        Ok(())
    }
}
