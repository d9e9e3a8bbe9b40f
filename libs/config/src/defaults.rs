//! Default configuration values
//!
//! These reproduce the reference chart: an ETH-like market at 1000 with a
//! 900-1100 position, a 1000 budget, and a 500-1500 price sweep.

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "HEDGE";

/// Market defaults
pub mod market {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    pub const PRICE_NOW: Decimal = dec!(1000);
    pub const RANGE_LOWER: Decimal = dec!(900);
    pub const RANGE_UPPER: Decimal = dec!(1100);
}

/// Hedge leg defaults
pub mod hedge {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    pub const TOTAL_BUDGET: Decimal = dec!(1000);
    pub const SHORT_REFERENCE_PRICE: Decimal = dec!(1000);
    pub const LEVERAGE: Decimal = dec!(1);

    /// Heuristic post-search rescaling of the AMM leg
    pub const AMM_SCALE: Decimal = dec!(1.25);

    /// Heuristic post-search rescaling of the short leg
    pub const SHORT_SCALE: Decimal = dec!(0.75);
}

/// Search defaults
pub mod search {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Token X grid spacing for capacity sizing
    pub const CAPACITY_STEP: Decimal = dec!(0.001);

    /// AMM budget increment between balance candidates
    pub const BALANCE_STEP: Decimal = dec!(0.1);

    /// Accepted `|PNL_amm + PNL_short|`
    pub const TOLERANCE: Decimal = dec!(0.1);

    pub const MAX_ITERATIONS: usize = 20_000;

    /// Iteration cap of the linear reference capacity scan
    pub const MAX_SCAN_ITERATIONS: usize = 1_000_000;
}

/// Price axis defaults (inclusive)
pub mod axis {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    pub const START: Decimal = dec!(500);
    pub const END: Decimal = dec!(1500);
    pub const STEP: Decimal = dec!(1);
}
