//! Transfer fee schedule
//!
//! Fees are flat and shown on the confirmation step only. They do not depend
//! on the currency.

const FREE_LIMIT: f64 = 1000.0;
const STANDARD_LIMIT: f64 = 10000.0;
const STANDARD_FEE: f64 = 2.5;
const LARGE_FEE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeBreakdown {
    pub amount: f64,
    pub fee: f64,
    pub total: f64,
}

/// Flat fee for a transfer amount. Both limits are inclusive.
pub fn calculate_fee(amount: f64) -> f64 {
    if amount <= FREE_LIMIT {
        0.0
    } else if amount <= STANDARD_LIMIT {
        STANDARD_FEE
    } else {
        LARGE_FEE
    }
}

pub fn breakdown(amount: f64) -> FeeBreakdown {
    let fee = calculate_fee(amount);
    FeeBreakdown {
        amount,
        fee,
        total: amount + fee,
    }
}
