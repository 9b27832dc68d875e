//! Standard deduction tables, including the age-65-or-older increment.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::household::FilingStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StandardDeduction {
    pub base: Decimal,
    /// Per qualifying taxpayer aged 65 or older.
    pub age_65_increment: Decimal,
}

impl StandardDeduction {
    pub fn total(&self, members_65_or_older: u8) -> Decimal {
        self.base + self.age_65_increment * Decimal::from(members_65_or_older)
    }
}

pub fn standard_deduction_2024(status: FilingStatus) -> StandardDeduction {
    match status {
        FilingStatus::Single => StandardDeduction { base: dec!(14600), age_65_increment: dec!(1950) },
        FilingStatus::MarriedJoint => StandardDeduction { base: dec!(29200), age_65_increment: dec!(1550) },
        FilingStatus::MarriedSeparate => StandardDeduction { base: dec!(14600), age_65_increment: dec!(1550) },
        FilingStatus::HeadOfHousehold => StandardDeduction { base: dec!(21900), age_65_increment: dec!(1950) },
    }
}
