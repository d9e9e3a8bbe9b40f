//! Errors raised by the liquidity math and the sizing searches
//!
//! Every variant is a domain error: the inputs describe a position or a
//! search that has no meaningful numeric answer. "No equal-PNL split" is
//! deliberately absent here; callers see it as `Ok(None)`.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HedgeError {
    /// Range bounds are inverted, equal, or not positive
    #[error("Invalid price range: lower {lower} must be positive and below upper {upper}")]
    InvalidRange { lower: Decimal, upper: Decimal },

    /// A price (or square-root price) input was zero or negative
    #[error("Non-positive price {price} ({context})")]
    NonPositivePrice { context: &'static str, price: Decimal },

    /// Capacity search asked to reach a target value of zero or below
    #[error("Target value must be positive, got {target}")]
    NonPositiveTarget { target: Decimal },

    /// Hedge balancing asked to split a budget of zero or below
    #[error("Total budget must be positive, got {budget}")]
    NonPositiveBudget { budget: Decimal },

    /// Square-root bounds coincide; the liquidity formulas would divide by zero
    #[error("Zero-width square-root span ({context})")]
    ZeroSpan { context: &'static str },

    /// Reserve, capital or step amount below zero
    #[error("Negative amount {amount} ({context})")]
    NegativeAmount { context: &'static str, amount: Decimal },

    /// Capacity sizing needs the spot price below the upper bound
    #[error("Price {price} is at or above the range upper bound {upper}")]
    PriceAboveRange { price: Decimal, upper: Decimal },

    /// Bounded linear scan stopped before crossing its target
    #[error("Scan exhausted after {iterations} iterations without reaching the target")]
    ScanExhausted { iterations: usize },

    /// A product or quotient left the representable `Decimal` range, or a
    /// divisor rounded to zero
    #[error("Arithmetic overflow ({context})")]
    Overflow { context: &'static str },
}

/// `a * b`, or [`HedgeError::Overflow`] when the product is not representable
pub(crate) fn mul(a: Decimal, b: Decimal, context: &'static str) -> Result<Decimal> {
    a.checked_mul(b).ok_or(HedgeError::Overflow { context })
}

/// `a / b`, or [`HedgeError::Overflow`] when `b` is zero or the quotient is not representable
pub(crate) fn div(a: Decimal, b: Decimal, context: &'static str) -> Result<Decimal> {
    a.checked_div(b).ok_or(HedgeError::Overflow { context })
}

/// `a + b`, or [`HedgeError::Overflow`] when the sum is not representable
pub(crate) fn add(a: Decimal, b: Decimal, context: &'static str) -> Result<Decimal> {
    a.checked_add(b).ok_or(HedgeError::Overflow { context })
}

pub type Result<T> = std::result::Result<T, HedgeError>;
