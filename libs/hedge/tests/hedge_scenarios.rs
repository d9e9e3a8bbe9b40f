//! Hedge Curve Scenario Tests
//!
//! End-to-end runs of the balancer and curve generator over the reference
//! market (spot 1000, range 900-1100, budget 1000, short opened at 1000).

use hedge_config::HedgeConfig;
use hedge_strategy::{
    Curve, CurveGenerator, CurveParams, HedgeBalancer, HedgeError, PriceRange, SplitAdjustment,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Initialize tracing for tests (call once per test)
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn reference_range() -> PriceRange {
    PriceRange::new(dec!(900), dec!(1100)).unwrap()
}

fn reference_params() -> CurveParams {
    CurveParams::from_config(&HedgeConfig::default()).unwrap()
}

#[test]
fn test_reference_market_has_equal_pnl_split() {
    init_tracing();

    let split = HedgeBalancer::default()
        .find_equal_pnl_split(dec!(1000), &reference_range(), dec!(900), dec!(1000), dec!(1000))
        .unwrap();

    let split = split.expect("reference market must balance");
    assert!(split.amm_capital > Decimal::ZERO);
    assert!(split.short_capital > Decimal::ZERO);
    assert_eq!(split.total(), dec!(1000));
}

#[test]
fn test_reference_curve_shape() {
    init_tracing();

    let curve = CurveGenerator::default().generate(&reference_params()).unwrap();

    assert_eq!(curve.len(), 1001);
    assert_eq!(curve.unhedged_values.len(), 1001);
    assert_eq!(curve.hedged_values.len(), 1001);
    assert_eq!(curve.prices.first(), Some(&dec!(500)));
    assert_eq!(curve.prices.last(), Some(&dec!(1500)));
    assert!(curve.prices.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_hedge_reduces_volatility() {
    init_tracing();

    let curve = CurveGenerator::default().generate(&reference_params()).unwrap();
    let volatility = curve.volatility().unwrap();

    assert!(
        volatility.hedged < volatility.unhedged,
        "hedged std dev {} should be below unhedged {}",
        volatility.hedged,
        volatility.unhedged
    );
}

#[test]
fn test_unhedged_leg_is_adjusted_amm_capital_at_spot() {
    let params = reference_params();
    let generator = CurveGenerator::default();
    let split = generator
        .balancer()
        .find_equal_pnl_split(
            params.price_now,
            &params.range,
            params.balance_target(),
            params.short_reference_price,
            params.total_budget,
        )
        .unwrap()
        .unwrap();
    let adjusted = SplitAdjustment::default().apply(&split);

    let curve = generator.generate(&params).unwrap();
    let (_, unhedged, hedged) = curve
        .points()
        .find(|(price, _, _)| *price == params.price_now)
        .unwrap();

    assert_eq!(unhedged, adjusted.amm_capital);
    assert_eq!(hedged, adjusted.amm_capital);
}

#[test]
fn test_hedged_curve_flatter_below_range() {
    // Below the range the AMM leg is all token X; the short leg offsets part of that slope
    let curve = CurveGenerator::default().generate(&reference_params()).unwrap();
    let unhedged_drop = curve.unhedged_values[400] - curve.unhedged_values[0];
    let hedged_drop = curve.hedged_values[400] - curve.hedged_values[0];

    assert!(unhedged_drop > Decimal::ZERO);
    assert!(hedged_drop < unhedged_drop);
}

#[test]
fn test_non_positive_budget_gives_empty_curve() {
    init_tracing();

    for budget in [dec!(0), dec!(-250)] {
        let mut params = reference_params();
        params.total_budget = budget;

        let curve = CurveGenerator::default().generate(&params).unwrap();
        assert_eq!(curve, Curve::empty());
        assert!(curve.is_empty());
        assert!(curve.volatility().is_none());
    }
}

#[test]
fn test_no_split_gives_empty_curve() {
    // A short opened at 800 loses along with the AMM leg when price falls to 900
    let mut params = reference_params();
    params.short_reference_price = dec!(800);

    let curve = CurveGenerator::default().generate(&params).unwrap();
    assert!(curve.is_empty());
    assert!(curve.unhedged_values.is_empty());
    assert!(curve.hedged_values.is_empty());
}

#[test]
fn test_invalid_geometry_is_error() {
    let mut params = reference_params();
    params.range = PriceRange {
        lower: dec!(1100),
        upper: dec!(900),
    };
    assert!(CurveGenerator::default().generate(&params).is_err());

    let mut params = reference_params();
    params.price_axis = vec![dec!(1000), dec!(0)];
    assert!(CurveGenerator::default().generate(&params).is_err());
}

#[test]
fn test_spot_at_or_above_range_is_domain_error() {
    init_tracing();

    for spot in [dec!(1100), dec!(1200)] {
        let mut params = reference_params();
        params.price_now = spot;

        let err = CurveGenerator::default().generate(&params).unwrap_err();
        assert!(
            matches!(err, HedgeError::PriceAboveRange { .. }),
            "spot {}: {:?}",
            spot,
            err
        );
    }
}

#[test]
fn test_large_budget_still_produces_curve() {
    let mut params = reference_params();
    params.total_budget = dec!(50000);
    params.price_axis = vec![dec!(900), dec!(1000), dec!(1100)];

    let curve = CurveGenerator::default().generate(&params).unwrap();
    assert_eq!(curve.len(), 3);
    assert!(curve.unhedged_values.iter().all(|value| *value > Decimal::ZERO));
}

#[test]
fn test_identity_adjustment_and_leverage_are_overridable() {
    let base = reference_params().with_adjustment(SplitAdjustment::identity());
    let levered = base.clone().with_leverage(dec!(2));

    let generator = CurveGenerator::default();
    let base_curve = generator.generate(&base).unwrap();
    let levered_curve = generator.generate(&levered).unwrap();

    assert_eq!(base_curve.unhedged_values, levered_curve.unhedged_values);
    for ((_, unhedged, hedged), (_, _, levered_hedged)) in
        base_curve.points().zip(levered_curve.points())
    {
        let short = hedged - unhedged;
        let levered_short = levered_hedged - unhedged;
        assert!((levered_short - short * dec!(2)).abs() < dec!(0.000000001));
    }
}

#[test]
fn test_curve_serializes_for_hosts() {
    let mut params = reference_params();
    params.price_axis = vec![dec!(900), dec!(1000), dec!(1100)];

    let curve = CurveGenerator::default().generate(&params).unwrap();
    let json = serde_json::to_value(&curve).unwrap();

    assert_eq!(json["prices"].as_array().unwrap().len(), 3);
    assert_eq!(json["unhedged_values"].as_array().unwrap().len(), 3);
    assert_eq!(json["hedged_values"].as_array().unwrap().len(), 3);

    let restored: Curve = serde_json::from_value(json).unwrap();
    assert_eq!(restored, curve);
}
