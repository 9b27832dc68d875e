//! Net Investment Income Tax (3.8% surtax) thresholds.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::household::FilingStatus;

pub const NIIT_RATE: f64 = 0.038;

/// NIIT AGI thresholds by filing status. Not inflation-indexed by statute.
pub fn niit_threshold_2024(status: FilingStatus) -> Decimal {
    match status {
        FilingStatus::MarriedJoint => dec!(250000),
        FilingStatus::MarriedSeparate => dec!(125000),
        FilingStatus::Single | FilingStatus::HeadOfHousehold => dec!(200000),
    }
}

/// 3.8% on the lesser of investment income or the excess of AGI over the
/// threshold; zero if AGI does not exceed the threshold.
pub fn niit_owed(agi: Decimal, investment_income: Decimal, status: FilingStatus) -> Decimal {
    let threshold = niit_threshold_2024(status);
    if agi <= threshold {
        return Decimal::ZERO;
    }
    let excess = agi - threshold;
    let base = investment_income.min(excess).max(Decimal::ZERO);
    base * Decimal::from_f64(NIIT_RATE).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_owes_nothing() {
        let owed = niit_owed(dec!(150000), dec!(50000), FilingStatus::Single);
        assert_eq!(owed, Decimal::ZERO);
    }

    #[test]
    fn excess_smaller_than_investment_income_caps_base() {
        // AGI exceeds threshold by $10,000; investment income is $50,000 —
        // the smaller of the two ($10,000) is the NIIT base.
        let owed = niit_owed(dec!(210000), dec!(50000), FilingStatus::Single);
        assert_eq!(owed, dec!(10000) * dec!(0.038));
    }

    #[test]
    fn investment_income_smaller_than_excess_caps_base() {
        let owed = niit_owed(dec!(600000), dec!(50000), FilingStatus::MarriedJoint);
        assert_eq!(owed, dec!(50000) * dec!(0.038));
    }
}
