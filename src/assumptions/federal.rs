//! Federal ordinary-income bracket tables.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::household::FilingStatus;

/// One marginal bracket: income above `floor` and up to the next bracket's
/// floor (or infinity, for the top bracket) is taxed at `rate`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bracket {
    pub floor: Decimal,
    pub rate: f64,
}

/// Seven-tier federal bracket schedule for one filing status, tax year 2024.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederalBrackets {
    pub brackets: Vec<Bracket>,
}

impl FederalBrackets {
    /// Tax owed on `taxable_income` via a bottom-up running-remainder walk.
    pub fn tax_owed(&self, taxable_income: Decimal) -> Decimal {
        if taxable_income <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let mut tax = Decimal::ZERO;
        for (bracket, next) in self.brackets.iter().zip(self.brackets[1..].iter()) {
            if taxable_income <= bracket.floor {
                break;
            }
            let ceiling = next.floor.min(taxable_income);
            let in_bracket = ceiling - bracket.floor;
            if in_bracket > Decimal::ZERO {
                tax += in_bracket * Decimal::from_f64(bracket.rate).unwrap_or(Decimal::ZERO);
            }
        }
        if let Some(top) = self.brackets.last() {
            if taxable_income > top.floor {
                let in_bracket = taxable_income - top.floor;
                tax += in_bracket * Decimal::from_f64(top.rate).unwrap_or(Decimal::ZERO);
            }
        }
        tax
    }

    /// Tax owed on an amount of income that begins accruing at
    /// `stacked_on_top_of` (the already-taxed ordinary portion) and extends
    /// for `amount` dollars — used to stack preferential income above
    /// ordinary income.
    pub fn tax_owed_stacked(&self, stacked_on_top_of: Decimal, amount: Decimal) -> Decimal {
        if amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let lower = self.tax_owed(stacked_on_top_of);
        let upper = self.tax_owed(stacked_on_top_of + amount);
        upper - lower
    }

    /// The rate of the topmost bracket whose floor is <= `taxable_income`.
    pub fn marginal_rate(&self, taxable_income: Decimal) -> f64 {
        self.brackets
            .iter()
            .rev()
            .find(|b| b.floor <= taxable_income)
            .map(|b| b.rate)
            .unwrap_or(0.0)
    }

    /// The floor of the next bracket above `taxable_income`, if any.
    pub fn next_bracket_floor(&self, taxable_income: Decimal) -> Option<Decimal> {
        self.brackets
            .iter()
            .map(|b| b.floor)
            .find(|floor| *floor > taxable_income)
    }
}

/// 2024 federal brackets for all four filing statuses.
pub fn federal_brackets_2024(status: FilingStatus) -> FederalBrackets {
    let brackets = match status {
        FilingStatus::Single => vec![
            Bracket { floor: dec!(0), rate: 0.10 },
            Bracket { floor: dec!(11600), rate: 0.12 },
            Bracket { floor: dec!(47150), rate: 0.22 },
            Bracket { floor: dec!(100525), rate: 0.24 },
            Bracket { floor: dec!(191950), rate: 0.32 },
            Bracket { floor: dec!(243725), rate: 0.35 },
            Bracket { floor: dec!(609350), rate: 0.37 },
        ],
        FilingStatus::MarriedJoint => vec![
            Bracket { floor: dec!(0), rate: 0.10 },
            Bracket { floor: dec!(23200), rate: 0.12 },
            Bracket { floor: dec!(94300), rate: 0.22 },
            Bracket { floor: dec!(201050), rate: 0.24 },
            Bracket { floor: dec!(383900), rate: 0.32 },
            Bracket { floor: dec!(487450), rate: 0.35 },
            Bracket { floor: dec!(731200), rate: 0.37 },
        ],
        FilingStatus::MarriedSeparate => vec![
            Bracket { floor: dec!(0), rate: 0.10 },
            Bracket { floor: dec!(11600), rate: 0.12 },
            Bracket { floor: dec!(47150), rate: 0.22 },
            Bracket { floor: dec!(100525), rate: 0.24 },
            Bracket { floor: dec!(191950), rate: 0.32 },
            Bracket { floor: dec!(243725), rate: 0.35 },
            Bracket { floor: dec!(365600), rate: 0.37 },
        ],
        FilingStatus::HeadOfHousehold => vec![
            Bracket { floor: dec!(0), rate: 0.10 },
            Bracket { floor: dec!(16550), rate: 0.12 },
            Bracket { floor: dec!(63100), rate: 0.22 },
            Bracket { floor: dec!(100500), rate: 0.24 },
            Bracket { floor: dec!(191950), rate: 0.32 },
            Bracket { floor: dec!(243700), rate: 0.35 },
            Bracket { floor: dec!(609350), rate: 0.37 },
        ],
    };
    FederalBrackets { brackets }
}
