//! Long-term capital gains / qualified dividend bracket tables.
//!
//! Three tiers per filing status: 0%, 15%, 20%. Stacking on top of ordinary
//! income is performed by [`crate::tax::engine::calculate_tax`], not here —
//! this module only supplies the thresholds.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::household::FilingStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LtcgTier {
    pub floor: Decimal,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LtcgBrackets {
    pub tiers: Vec<LtcgTier>,
}

impl LtcgBrackets {
    /// Tax owed on LTCG/qualified-dividend income that starts accruing at
    /// `ordinary_position` (the ordinary taxable income it is stacked on
    /// top of) and runs for `amount` dollars.
    pub fn tax_owed_stacked(&self, ordinary_position: Decimal, amount: Decimal) -> Decimal {
        if amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let mut tax = Decimal::ZERO;
        let mut position = ordinary_position;
        let mut remaining = amount;
        for (tier, next) in self.tiers.iter().zip(
            self.tiers[1..]
                .iter()
                .map(Some)
                .chain(std::iter::once(None)),
        ) {
            let tier_ceiling = next.map(|t| t.floor).unwrap_or(Decimal::MAX);
            if position >= tier_ceiling {
                continue;
            }
            let room_in_tier = (tier_ceiling - position).max(Decimal::ZERO);
            let taxed_here = remaining.min(room_in_tier);
            if taxed_here > Decimal::ZERO {
                tax += taxed_here * Decimal::from_f64(tier.rate).unwrap_or(Decimal::ZERO);
                position += taxed_here;
                remaining -= taxed_here;
            }
            if remaining <= Decimal::ZERO {
                break;
            }
        }
        tax
    }
}

pub fn ltcg_brackets_2024(status: FilingStatus) -> LtcgBrackets {
    let tiers = match status {
        FilingStatus::Single => vec![
            LtcgTier { floor: dec!(0), rate: 0.0 },
            LtcgTier { floor: dec!(47025), rate: 0.15 },
            LtcgTier { floor: dec!(518900), rate: 0.20 },
        ],
        FilingStatus::MarriedJoint => vec![
            LtcgTier { floor: dec!(0), rate: 0.0 },
            LtcgTier { floor: dec!(94050), rate: 0.15 },
            LtcgTier { floor: dec!(583750), rate: 0.20 },
        ],
        FilingStatus::MarriedSeparate => vec![
            LtcgTier { floor: dec!(0), rate: 0.0 },
            LtcgTier { floor: dec!(47025), rate: 0.15 },
            LtcgTier { floor: dec!(291850), rate: 0.20 },
        ],
        FilingStatus::HeadOfHousehold => vec![
            LtcgTier { floor: dec!(0), rate: 0.0 },
            LtcgTier { floor: dec!(63000), rate: 0.15 },
            LtcgTier { floor: dec!(551350), rate: 0.20 },
        ],
    };
    LtcgBrackets { tiers }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ltcg_stacking_at_top_of_zero_bracket_mfj() {
        // spec.md §8: ordinary taxable income at exactly $94,050 (MFJ 2024
        // 0%-bracket ceiling); the next dollar of LTCG must be taxed at 15%.
        let b = ltcg_brackets_2024(FilingStatus::MarriedJoint);
        let tax_on_first_dollar = b.tax_owed_stacked(dec!(94050), dec!(1));
        assert_eq!(tax_on_first_dollar, dec!(0.15));
    }

    #[test]
    fn ltcg_fully_inside_zero_bracket_is_untaxed() {
        let b = ltcg_brackets_2024(FilingStatus::MarriedJoint);
        let tax = b.tax_owed_stacked(dec!(50000), dec!(10000));
        assert_eq!(tax, Decimal::ZERO);
    }

    #[test]
    fn ltcg_straddling_zero_and_fifteen_splits_correctly() {
        let b = ltcg_brackets_2024(FilingStatus::MarriedJoint);
        // $10,000 of LTCG stacked starting $4,050 below the $94,050 ceiling:
        // $4,050 at 0%, remaining $5,950 at 15%.
        let tax = b.tax_owed_stacked(dec!(90000), dec!(10000));
        assert_eq!(tax, dec!(5950) * dec!(0.15));
    }
}
