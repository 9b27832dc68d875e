//! Medicare IRMAA (Income-Related Monthly Adjustment Amount) tiers.
//!
//! Six tiers per filing status, each with a monthly Part B and Part D
//! dollar surcharge. The highest tier has no ceiling (`None` ≡ +∞). Tier
//! selection is strict `<=` on the tier ceiling, falling through to the
//! top tier when MAGI exceeds every tabulated ceiling.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::household::FilingStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IrmaaTier {
    /// `None` on the top tier ⇒ unbounded.
    pub magi_ceiling: Option<Decimal>,
    pub part_b_monthly: Decimal,
    pub part_d_monthly: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrmaaTiers {
    pub tiers: Vec<IrmaaTier>,
}

/// Result of an IRMAA lookup for one household.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrmaaResult {
    pub part_b_annual: Decimal,
    pub part_d_annual: Decimal,
    pub total_annual: Decimal,
    /// 0-indexed tier, 0 = no surcharge.
    pub tier: usize,
    pub magi: Decimal,
}

impl IrmaaTiers {
    /// Annual IRMAA surcharge for `magi`, applied per Medicare-eligible
    /// member. Households with zero eligible members owe nothing.
    pub fn surcharge(&self, magi: Decimal, medicare_eligible_members: u8) -> IrmaaResult {
        if medicare_eligible_members == 0 {
            return IrmaaResult {
                part_b_annual: Decimal::ZERO,
                part_d_annual: Decimal::ZERO,
                total_annual: Decimal::ZERO,
                tier: 0,
                magi,
            };
        }
        let (tier_index, tier) = self
            .tiers
            .iter()
            .enumerate()
            .find(|(_, t)| t.magi_ceiling.map(|c| magi <= c).unwrap_or(true))
            .unwrap_or((0, &self.tiers[0]));

        let members = Decimal::from(medicare_eligible_members);
        let part_b_annual = tier.part_b_monthly * dec!(12) * members;
        let part_d_annual = tier.part_d_monthly * dec!(12) * members;
        IrmaaResult {
            part_b_annual,
            part_d_annual,
            total_annual: part_b_annual + part_d_annual,
            tier: tier_index,
            magi,
        }
    }
}

/// 2024 IRMAA tiers (married-joint shown; single/HoH use the /2 thresholds
/// IRS publishes for non-joint filers, MFS collapses to two tiers only).
pub fn irmaa_tiers_2024(status: FilingStatus) -> IrmaaTiers {
    let tiers = match status {
        FilingStatus::MarriedJoint => vec![
            IrmaaTier { magi_ceiling: Some(dec!(206000)), part_b_monthly: dec!(0.00), part_d_monthly: dec!(0.00) },
            IrmaaTier { magi_ceiling: Some(dec!(258000)), part_b_monthly: dec!(244.60), part_d_monthly: dec!(12.90) },
            IrmaaTier { magi_ceiling: Some(dec!(322000)), part_b_monthly: dec!(349.40), part_d_monthly: dec!(33.30) },
            IrmaaTier { magi_ceiling: Some(dec!(386000)), part_b_monthly: dec!(454.20), part_d_monthly: dec!(53.80) },
            IrmaaTier { magi_ceiling: Some(dec!(750000)), part_b_monthly: dec!(559.00), part_d_monthly: dec!(74.20) },
            IrmaaTier { magi_ceiling: None, part_b_monthly: dec!(594.00), part_d_monthly: dec!(81.00) },
        ],
        FilingStatus::MarriedSeparate => vec![
            IrmaaTier { magi_ceiling: Some(dec!(103000)), part_b_monthly: dec!(0.00), part_d_monthly: dec!(0.00) },
            IrmaaTier { magi_ceiling: Some(dec!(397000)), part_b_monthly: dec!(559.00), part_d_monthly: dec!(74.20) },
            IrmaaTier { magi_ceiling: None, part_b_monthly: dec!(594.00), part_d_monthly: dec!(81.00) },
            // MFS has only three tiers; the remaining entries mirror the
            // top tier so tier-count stays uniform across filing statuses.
            IrmaaTier { magi_ceiling: None, part_b_monthly: dec!(594.00), part_d_monthly: dec!(81.00) },
            IrmaaTier { magi_ceiling: None, part_b_monthly: dec!(594.00), part_d_monthly: dec!(81.00) },
            IrmaaTier { magi_ceiling: None, part_b_monthly: dec!(594.00), part_d_monthly: dec!(81.00) },
        ],
        FilingStatus::Single | FilingStatus::HeadOfHousehold => vec![
            IrmaaTier { magi_ceiling: Some(dec!(103000)), part_b_monthly: dec!(0.00), part_d_monthly: dec!(0.00) },
            IrmaaTier { magi_ceiling: Some(dec!(129000)), part_b_monthly: dec!(244.60), part_d_monthly: dec!(12.90) },
            IrmaaTier { magi_ceiling: Some(dec!(161000)), part_b_monthly: dec!(349.40), part_d_monthly: dec!(33.30) },
            IrmaaTier { magi_ceiling: Some(dec!(193000)), part_b_monthly: dec!(454.20), part_d_monthly: dec!(53.80) },
            IrmaaTier { magi_ceiling: Some(dec!(500000)), part_b_monthly: dec!(559.00), part_d_monthly: dec!(74.20) },
            IrmaaTier { magi_ceiling: None, part_b_monthly: dec!(594.00), part_d_monthly: dec!(81.00) },
        ],
    };
    IrmaaTiers { tiers }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_first_tier_owes_nothing() {
        let tiers = irmaa_tiers_2024(FilingStatus::MarriedJoint);
        let result = tiers.surcharge(dec!(150000), 2);
        assert_eq!(result.tier, 0);
        assert_eq!(result.total_annual, Decimal::ZERO);
    }

    #[test]
    fn first_surcharge_tier_charges_above_the_first_threshold() {
        let tiers = irmaa_tiers_2024(FilingStatus::MarriedJoint);
        let result = tiers.surcharge(dec!(220000), 1);
        assert_eq!(result.tier, 1);
        assert_eq!(result.total_annual, (dec!(244.60) + dec!(12.90)) * dec!(12));
    }

    #[test]
    fn above_every_ceiling_falls_to_top_tier() {
        let tiers = irmaa_tiers_2024(FilingStatus::MarriedJoint);
        let result = tiers.surcharge(dec!(5_000_000), 2);
        assert_eq!(result.tier, 5);
        assert!(result.total_annual > Decimal::ZERO);
    }

    #[test]
    fn zero_medicare_eligible_members_owes_nothing() {
        let tiers = irmaa_tiers_2024(FilingStatus::MarriedJoint);
        let result = tiers.surcharge(dec!(5_000_000), 0);
        assert_eq!(result.total_annual, Decimal::ZERO);
    }

    #[test]
    fn surcharge_scales_with_member_count() {
        let tiers = irmaa_tiers_2024(FilingStatus::MarriedJoint);
        let one = tiers.surcharge(dec!(700000), 1);
        let two = tiers.surcharge(dec!(700000), 2);
        assert_eq!(two.total_annual, one.total_annual * dec!(2));
    }
}
