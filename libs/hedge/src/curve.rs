//! Value curves of the unhedged and hedged AMM position across a price axis

use hedge_amm::{HedgeError, Market, PositionSimulator, PriceRange, Result};
use hedge_config::HedgeConfig;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::balancer::{HedgeBalancer, SplitAdjustment};

/// Index-aligned price, unhedged value and hedged value series
///
/// An empty curve is the defined output when no hedge could be built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Curve {
    pub prices: Vec<Decimal>,
    pub unhedged_values: Vec<Decimal>,
    pub hedged_values: Vec<Decimal>,
}

/// Population standard deviation of each series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveVolatility {
    pub unhedged: Decimal,
    pub hedged: Decimal,
}

impl Curve {
    pub fn empty() -> Self {
        Self::default()
    }

    fn with_capacity(points: usize) -> Self {
        Self {
            prices: Vec::with_capacity(points),
            unhedged_values: Vec::with_capacity(points),
            hedged_values: Vec::with_capacity(points),
        }
    }

    fn push(&mut self, price: Decimal, unhedged: Decimal, hedged: Decimal) {
        self.prices.push(price);
        self.unhedged_values.push(unhedged);
        self.hedged_values.push(hedged);
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// `(price, unhedged, hedged)` triples in axis order
    pub fn points(&self) -> impl Iterator<Item = (Decimal, Decimal, Decimal)> + '_ {
        self.prices
            .iter()
            .zip(&self.unhedged_values)
            .zip(&self.hedged_values)
            .map(|((price, unhedged), hedged)| (*price, *unhedged, *hedged))
    }

    /// `None` for an empty curve, or when a series is too large to square
    pub fn volatility(&self) -> Option<CurveVolatility> {
        Some(CurveVolatility {
            unhedged: population_std_dev(&self.unhedged_values)?,
            hedged: population_std_dev(&self.hedged_values)?,
        })
    }
}

fn population_std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let count = Decimal::from(values.len());
    let mean = values
        .iter()
        .try_fold(Decimal::ZERO, |sum, value| sum.checked_add(*value))?
        .checked_div(count)?;
    let variance = values
        .iter()
        .try_fold(Decimal::ZERO, |sum, value| {
            let deviation = value.checked_sub(mean)?;
            sum.checked_add(deviation.checked_mul(deviation)?)
        })?
        .checked_div(count)?;
    variance.sqrt()
}

/// Inputs of one curve computation
///
/// `target_price` defaults to the range's lower bound, the move the hedge is
/// balanced against.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveParams {
    pub price_now: Decimal,
    pub range: PriceRange,
    pub total_budget: Decimal,
    pub short_reference_price: Decimal,
    pub target_price: Option<Decimal>,
    /// Multiplier on the short leg's PNL when charting
    pub leverage: Decimal,
    pub price_axis: Vec<Decimal>,
    pub adjustment: SplitAdjustment,
}

impl CurveParams {
    pub fn new(
        price_now: Decimal,
        range: PriceRange,
        total_budget: Decimal,
        short_reference_price: Decimal,
        price_axis: Vec<Decimal>,
    ) -> Self {
        Self {
            price_now,
            range,
            total_budget,
            short_reference_price,
            target_price: None,
            leverage: Decimal::ONE,
            price_axis,
            adjustment: SplitAdjustment::default(),
        }
    }

    pub fn with_leverage(mut self, leverage: Decimal) -> Self {
        self.leverage = leverage;
        self
    }

    pub fn with_target_price(mut self, target_price: Decimal) -> Self {
        self.target_price = Some(target_price);
        self
    }

    pub fn with_adjustment(mut self, adjustment: SplitAdjustment) -> Self {
        self.adjustment = adjustment;
        self
    }

    pub fn from_config(config: &HedgeConfig) -> Result<Self> {
        let range = PriceRange::new(config.market.range_lower, config.market.range_upper)?;
        Ok(Self {
            price_now: config.market.price_now,
            range,
            total_budget: config.hedge.total_budget,
            short_reference_price: config.hedge.short_reference_price,
            target_price: config.hedge.target_price,
            leverage: config.hedge.leverage,
            price_axis: config.axis.prices(),
            adjustment: SplitAdjustment {
                amm_scale: config.hedge.amm_scale,
                short_scale: config.hedge.short_scale,
            },
        })
    }

    pub fn balance_target(&self) -> Decimal {
        self.target_price.unwrap_or(self.range.lower)
    }
}

/// Sweeps a price axis over the hedge found by [`HedgeBalancer`]
#[derive(Debug, Clone, Default)]
pub struct CurveGenerator {
    balancer: HedgeBalancer,
}

impl CurveGenerator {
    pub fn new(balancer: HedgeBalancer) -> Self {
        Self { balancer }
    }

    pub fn from_config(config: &HedgeConfig) -> Self {
        Self::new(HedgeBalancer::from_config(&config.search))
    }

    pub fn balancer(&self) -> &HedgeBalancer {
        &self.balancer
    }

    /// Unhedged and hedged values of the adjusted equal-PNL split at every axis price
    ///
    /// A non-positive budget or a market with no equal-PNL split yields
    /// [`Curve::empty`]; invalid geometry or prices are errors.
    pub fn generate(&self, params: &CurveParams) -> Result<Curve> {
        if params.total_budget <= Decimal::ZERO {
            debug!(budget = %params.total_budget, "non-positive budget, empty curve");
            return Ok(Curve::empty());
        }
        if params.leverage < Decimal::ZERO {
            return Err(HedgeError::NegativeAmount {
                context: "short leverage",
                amount: params.leverage,
            });
        }
        params.range.validate()?;

        let Some(found) = self.balancer.find_equal_pnl_split(
            params.price_now,
            &params.range,
            params.balance_target(),
            params.short_reference_price,
            params.total_budget,
        )?
        else {
            return Ok(Curve::empty());
        };

        let split = params.adjustment.apply(&found);
        let market = Market::new(params.price_now, params.range)?;
        let position = self
            .balancer
            .capacity()
            .position_for_budget(&market, split.amm_capital)?;

        let mut curve = Curve::with_capacity(params.price_axis.len());
        for &price in &params.price_axis {
            let unhedged = PositionSimulator::rebalance(&position, price)?.value_at(price)?;
            let short = HedgeBalancer::short_pnl(
                split.short_capital,
                params.short_reference_price,
                price,
            )?;
            let hedged = short
                .checked_mul(params.leverage)
                .and_then(|levered| unhedged.checked_add(levered))
                .ok_or(HedgeError::Overflow {
                    context: "hedged value",
                })?;
            curve.push(price, unhedged, hedged);
        }

        info!(
            points = curve.len(),
            amm_capital = %split.amm_capital,
            short_capital = %split.short_capital,
            leverage = %params.leverage,
            "hedge curve generated"
        );
        Ok(curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn axis(start: i64, end: i64) -> Vec<Decimal> {
        (start..=end).map(Decimal::from).collect()
    }

    fn default_params() -> CurveParams {
        CurveParams::new(
            dec!(1000),
            PriceRange::new(dec!(900), dec!(1100)).unwrap(),
            dec!(1000),
            dec!(1000),
            axis(500, 1500),
        )
    }

    #[test]
    fn test_std_dev() {
        let values = [dec!(2), dec!(4), dec!(4), dec!(4), dec!(5), dec!(5), dec!(7), dec!(9)];
        let std_dev = population_std_dev(&values).unwrap();
        assert!((std_dev - dec!(2)).abs() < dec!(0.0000001));
        assert_eq!(population_std_dev(&[]), None);
    }

    #[test]
    fn test_std_dev_overflow_is_none() {
        let huge = Decimal::from_i128_with_scale(2 * 10_i128.pow(15), 0);
        assert_eq!(population_std_dev(&[dec!(0), huge]), None);

        let mut curve = Curve::empty();
        curve.push(dec!(1), dec!(0), dec!(0));
        curve.push(dec!(2), huge, dec!(1));
        assert!(curve.volatility().is_none());
    }

    #[test]
    fn test_points_are_aligned() {
        let mut curve = Curve::empty();
        curve.push(dec!(1), dec!(10), dec!(11));
        curve.push(dec!(2), dec!(20), dec!(21));
        let points: Vec<_> = curve.points().collect();
        assert_eq!(points, vec![(dec!(1), dec!(10), dec!(11)), (dec!(2), dec!(20), dec!(21))]);
    }

    #[test]
    fn test_balance_target_defaults_to_lower_bound() {
        let params = default_params();
        assert_eq!(params.balance_target(), dec!(900));
        assert_eq!(params.with_target_price(dec!(950)).balance_target(), dec!(950));
    }

    #[test]
    fn test_zero_leverage_leaves_curve_unhedged() {
        let params = default_params().with_leverage(dec!(0));
        let curve = CurveGenerator::default().generate(&params).unwrap();
        assert!(!curve.is_empty());
        assert_eq!(curve.unhedged_values, curve.hedged_values);
    }

    #[test]
    fn test_at_reference_price_short_adds_nothing() {
        let curve = CurveGenerator::default().generate(&default_params()).unwrap();
        let (_, unhedged, hedged) = curve
            .points()
            .find(|(price, _, _)| *price == dec!(1000))
            .unwrap();
        assert_eq!(unhedged, hedged);
    }

    #[test]
    fn test_negative_leverage_rejected() {
        let params = default_params().with_leverage(dec!(-1));
        assert!(CurveGenerator::default().generate(&params).is_err());
    }
}
