//! Household profile and account-bucket data model.
//!
//! Generalizes the teacher's single-policy `Policy` record into a
//! multi-member household profile. Account type is a tagged variant, not a
//! polymorphic hierarchy, per the design notes in the source specification.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// IRS filing status. `MarriedSeparate` collapses the Social-Security
/// combined-income thresholds to zero, matching the statutory treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

impl FilingStatus {
    /// Number of "taxpayer units" for standard-deduction multiplication:
    /// married-joint counts both spouses, every other status counts one.
    pub fn taxpayer_count(&self) -> u8 {
        match self {
            FilingStatus::MarriedJoint => 2,
            _ => 1,
        }
    }
}

/// Taxpayer profile consumed by the Tax Engine and Sequencer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    /// Two-letter state code; determines the state-tax rule.
    pub state: String,
    pub filing_status: FilingStatus,
    /// Primary member's current age.
    pub age1: u32,
    /// Spouse's current age, if any.
    pub age2: Option<u32>,
    /// Informational only; not used in current tax computation.
    pub dependents: u32,
}

impl Household {
    /// Count of members aged 65 or older, used for the standard-deduction
    /// age increment.
    pub fn members_65_or_older(&self) -> u8 {
        let mut count = 0;
        if self.age1 >= 65 {
            count += 1;
        }
        if let Some(age2) = self.age2 {
            if age2 >= 65 {
                count += 1;
            }
        }
        count
    }

    /// Count of members aged 65 or older (Medicare-eligible), used for IRMAA.
    pub fn medicare_eligible_members(&self) -> u8 {
        self.members_65_or_older()
    }
}

/// Tagged account-bucket key. Tax treatment is a single-valued function of
/// the tag; avoid modeling accounts as a class hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    Taxable,
    IraTraditional,
    Employer401kTraditional,
    IraRoth,
    Hsa,
}

/// Balances at an instant, keyed by tax treatment. Every balance is
/// non-negative; withdrawals are clamped to the available balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBuckets {
    pub balances: HashMap<BucketKind, Decimal>,
    /// Assumed embedded-gain fraction of the taxable bucket (spec default 30%).
    pub taxable_embedded_gain_fraction: f64,
}

impl AccountBuckets {
    pub fn new() -> Self {
        AccountBuckets {
            balances: HashMap::new(),
            taxable_embedded_gain_fraction: 0.30,
        }
    }

    pub fn balance(&self, kind: BucketKind) -> Decimal {
        self.balances.get(&kind).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn set_balance(&mut self, kind: BucketKind, amount: Decimal) {
        let floored = amount.max(Decimal::ZERO);
        self.balances.insert(kind, floored);
    }

    /// Subtract `amount` from `kind`, clamped so the bucket never goes
    /// negative. Returns the amount actually withdrawn.
    pub fn withdraw(&mut self, kind: BucketKind, amount: Decimal) -> Decimal {
        let available = self.balance(kind);
        let drawn = amount.min(available).max(Decimal::ZERO);
        self.set_balance(kind, available - drawn);
        drawn
    }

    pub fn deposit(&mut self, kind: BucketKind, amount: Decimal) {
        let current = self.balance(kind);
        self.set_balance(kind, current + amount);
    }

    pub fn total(&self) -> Decimal {
        self.balances.values().copied().sum()
    }
}

impl Default for AccountBuckets {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs to the Tax Engine for one tax year.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeBreakdown {
    /// Wages, interest, short-term gains, traditional-IRA distributions.
    pub ordinary_income: Decimal,
    /// From taxable accounts, held > 1 year.
    pub long_term_capital_gains: Decimal,
    /// Taxed at LTCG rates.
    pub qualified_dividends: Decimal,
    /// Gross Social Security benefit; the engine computes the taxable portion.
    pub social_security: Decimal,
    /// Not taxed, but included in MAGI for the surcharge tier.
    pub roth_distributions: Decimal,
    /// Not taxed, but included in MAGI.
    pub municipal_bond_interest: Decimal,
}

/// Annual spending need and other-income inputs to the sequencer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Needs {
    pub target_spending: Decimal,
    pub social_security: Decimal,
    pub pension: Decimal,
    pub other_income: Decimal,
}

/// Caller-tunable options for one sequencer invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalOptions {
    pub allow_roth_withdrawals: bool,
    pub charitable_giving: Decimal,
    pub tax_loss_harvest_available: Decimal,
    pub roth_conversion_budget: Decimal,
    /// Assumption, not a hard-coded constant: the future marginal rate used
    /// to judge whether a Roth conversion is worthwhile.
    pub roth_future_marginal_rate: f64,
}

impl Default for WithdrawalOptions {
    fn default() -> Self {
        WithdrawalOptions {
            allow_roth_withdrawals: false,
            charitable_giving: Decimal::ZERO,
            tax_loss_harvest_available: Decimal::ZERO,
            roth_conversion_budget: Decimal::ZERO,
            roth_future_marginal_rate: 0.24,
        }
    }
}
