//! Withdrawal Sequencer (spec component D): the annual optimizer that
//! orders withdrawals across buckets, invokes the Tax Engine, and
//! optionally sizes a Roth conversion.
//!
//! Grounded in `conman124-retirement/src/withdrawal.rs`'s
//! allocate-then-record-shortfall shape, generalized from a single
//! proportional draw into the nine ordered phases spec.md §4.D specifies.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::TaxTables;
use crate::household::{AccountBuckets, BucketKind, Household, IncomeBreakdown, Needs, WithdrawalOptions};
use crate::tax::engine::{calculate_tax, TaxResult};
use crate::tax::rmd::required_distribution;

/// Recommendation on whether to execute a proposed Roth conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RothRecommendation {
    Convert,
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RothConversionPlan {
    pub amount: Decimal,
    pub additional_tax: Decimal,
    pub break_even_years: Option<f64>,
    pub recommendation: RothRecommendation,
}

/// Output of the sequencer for one year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalPlan {
    pub withdrawals: HashMap<BucketKind, Decimal>,
    pub rmds: HashMap<BucketKind, Decimal>,
    pub qcd_used: Decimal,
    pub tax_loss_harvested: Decimal,
    pub roth_conversion: RothConversionPlan,
    pub shortfall: Decimal,
    pub tax_result: TaxResult,
    pub efficiency_score: f64,
}

const QCD_ANNUAL_CAP: Decimal = dec!(105000);

/// `Optimize(AccountBuckets, Needs, Household, Options) -> WithdrawalPlan`.
/// Pure: does not mutate `buckets`; the caller (the Projection Driver)
/// applies the returned withdrawal map.
pub fn optimize(
    buckets: &AccountBuckets,
    needs: &Needs,
    household: &Household,
    options: &WithdrawalOptions,
    tables: &TaxTables,
) -> WithdrawalPlan {
    let mut withdrawals: HashMap<BucketKind, Decimal> = HashMap::new();
    let mut rmds: HashMap<BucketKind, Decimal> = HashMap::new();

    // Phase 1 — required distributions.
    let traditional_ira_balance = buckets.balance(BucketKind::IraTraditional);
    let employer_401k_balance = buckets.balance(BucketKind::Employer401kTraditional);
    let ira_rmd = required_distribution(household.age1, traditional_ira_balance, &tables.rmd_table);
    let employer_401k_rmd = required_distribution(household.age1, employer_401k_balance, &tables.rmd_table);
    if ira_rmd > Decimal::ZERO {
        rmds.insert(BucketKind::IraTraditional, ira_rmd);
        withdrawals.insert(BucketKind::IraTraditional, ira_rmd);
    }
    if employer_401k_rmd > Decimal::ZERO {
        rmds.insert(BucketKind::Employer401kTraditional, employer_401k_rmd);
        withdrawals.insert(BucketKind::Employer401kTraditional, employer_401k_rmd);
    }
    let total_rmds = ira_rmd + employer_401k_rmd;

    // Phase 2 — gap computation.
    let other_income = needs.social_security + needs.pension + needs.other_income + total_rmds;
    let mut remaining = (needs.target_spending - other_income).max(Decimal::ZERO);

    // Phase 3 — qualified charitable distributions.
    let mut qcd_used = Decimal::ZERO;
    if options.charitable_giving > Decimal::ZERO && ira_rmd > Decimal::ZERO {
        qcd_used = options.charitable_giving.min(QCD_ANNUAL_CAP).min(ira_rmd);
        remaining = (remaining - qcd_used).max(Decimal::ZERO);
    }

    // Phase 4 — taxable accounts (LTCG rates), lowest marginal cost first.
    let embedded_gain_fraction =
        Decimal::from_f64(buckets.taxable_embedded_gain_fraction).unwrap_or(dec!(0.30));
    let taxable_balance = buckets.balance(BucketKind::Taxable);
    let taxable_withdrawal = remaining.min(taxable_balance);
    if taxable_withdrawal > Decimal::ZERO {
        *withdrawals.entry(BucketKind::Taxable).or_insert(Decimal::ZERO) += taxable_withdrawal;
    }
    remaining = (remaining - taxable_withdrawal).max(Decimal::ZERO);

    let tax_loss_harvested = options
        .tax_loss_harvest_available
        .min(taxable_withdrawal * embedded_gain_fraction)
        .max(Decimal::ZERO);

    // Phase 5 — tax-deferred (ordinary rates), respecting RMDs already taken.
    let ira_available = (traditional_ira_balance - ira_rmd).max(Decimal::ZERO);
    let ira_additional = remaining.min(ira_available);
    if ira_additional > Decimal::ZERO {
        *withdrawals.entry(BucketKind::IraTraditional).or_insert(Decimal::ZERO) += ira_additional;
    }
    remaining = (remaining - ira_additional).max(Decimal::ZERO);

    let employer_401k_available = (employer_401k_balance - employer_401k_rmd).max(Decimal::ZERO);
    let employer_401k_additional = remaining.min(employer_401k_available);
    if employer_401k_additional > Decimal::ZERO {
        *withdrawals
            .entry(BucketKind::Employer401kTraditional)
            .or_insert(Decimal::ZERO) += employer_401k_additional;
    }
    remaining = (remaining - employer_401k_additional).max(Decimal::ZERO);

    // Phase 6 — tax-free (Roth); preserved unless explicitly permitted.
    let mut roth_withdrawal = Decimal::ZERO;
    if options.allow_roth_withdrawals {
        let roth_balance = buckets.balance(BucketKind::IraRoth);
        roth_withdrawal = remaining.min(roth_balance);
        if roth_withdrawal > Decimal::ZERO {
            withdrawals.insert(BucketKind::IraRoth, roth_withdrawal);
        }
        remaining = (remaining - roth_withdrawal).max(Decimal::ZERO);
    }

    let shortfall = remaining;

    // Phase 7 — income synthesis for tax calculation.
    let total_traditional_distributions =
        ira_rmd + ira_additional + employer_401k_rmd + employer_401k_additional;
    let ordinary_income = (total_traditional_distributions - qcd_used).max(Decimal::ZERO);
    let ltcg = (taxable_withdrawal * embedded_gain_fraction - tax_loss_harvested).max(Decimal::ZERO);
    let income = IncomeBreakdown {
        ordinary_income,
        long_term_capital_gains: ltcg,
        qualified_dividends: Decimal::ZERO,
        social_security: needs.social_security,
        roth_distributions: roth_withdrawal,
        municipal_bond_interest: Decimal::ZERO,
    };
    let tax_result = calculate_tax(&income, household, tables);

    // Phase 8 — Roth-conversion optimizer.
    let roth_conversion = roth_conversion_plan(
        traditional_ira_balance - ira_rmd - ira_additional,
        tax_result.taxable_income,
        household,
        options,
        tables,
    );

    // Phase 9 — efficiency score.
    let mut score = 100.0_f64;
    if qcd_used > Decimal::ZERO {
        score += 10.0;
    }
    if tax_loss_harvested > Decimal::ZERO {
        score += 5.0;
    }
    let combined_rate_pct = (tax_result.effective_rate * 100.0) - 25.0;
    if combined_rate_pct > 0.0 {
        score -= 0.5 * combined_rate_pct;
    }
    let efficiency_score = score.clamp(0.0, 100.0);

    WithdrawalPlan {
        withdrawals,
        rmds,
        qcd_used,
        tax_loss_harvested,
        roth_conversion,
        shortfall,
        tax_result,
        efficiency_score,
    }
}

/// Phase 8 helper: propose a conversion sized to fill the remaining room in
/// the current federal bracket, compare the immediate tax cost against a
/// discounted future-marginal-rate savings estimate.
fn roth_conversion_plan(
    remaining_ira_balance: Decimal,
    current_taxable_income: Decimal,
    household: &Household,
    options: &WithdrawalOptions,
    tables: &TaxTables,
) -> RothConversionPlan {
    if options.roth_conversion_budget <= Decimal::ZERO || remaining_ira_balance <= Decimal::ZERO {
        return RothConversionPlan {
            amount: Decimal::ZERO,
            additional_tax: Decimal::ZERO,
            break_even_years: None,
            recommendation: RothRecommendation::Skip,
        };
    }

    let federal = tables.federal_for(household.filing_status);
    let next_threshold = match federal.next_bracket_floor(current_taxable_income) {
        Some(t) => t,
        None => {
            return RothConversionPlan {
                amount: Decimal::ZERO,
                additional_tax: Decimal::ZERO,
                break_even_years: None,
                recommendation: RothRecommendation::Skip,
            };
        }
    };

    let room = (next_threshold - current_taxable_income).max(Decimal::ZERO);
    let conversion = options.roth_conversion_budget.min(room).min(remaining_ira_balance);
    if conversion <= Decimal::ZERO {
        return RothConversionPlan {
            amount: Decimal::ZERO,
            additional_tax: Decimal::ZERO,
            break_even_years: None,
            recommendation: RothRecommendation::Skip,
        };
    }

    let current_marginal_rate = federal.marginal_rate(current_taxable_income);
    let additional_tax = conversion * Decimal::from_f64(current_marginal_rate).unwrap_or(Decimal::ZERO);

    let future_rate = options.roth_future_marginal_rate;
    let future_tax_avoided = conversion * Decimal::from_f64(future_rate).unwrap_or(Decimal::ZERO);

    let (recommendation, break_even_years) = if future_tax_avoided > additional_tax {
        let savings = (future_tax_avoided - additional_tax).to_f64().unwrap_or(0.0);
        let annual_growth = conversion.to_f64().unwrap_or(0.0) * 0.05;
        let years = if annual_growth > 0.0 {
            Some((savings / annual_growth).max(0.0))
        } else {
            None
        };
        (RothRecommendation::Convert, years)
    } else {
        (RothRecommendation::Skip, None)
    };

    RothConversionPlan {
        amount: conversion,
        additional_tax,
        break_even_years,
        recommendation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::household::FilingStatus;

    fn tables() -> TaxTables {
        TaxTables::for_year(2024).unwrap()
    }

    fn household() -> Household {
        Household {
            state: "AZ".to_string(),
            filing_status: FilingStatus::MarriedJoint,
            age1: 67,
            age2: Some(65),
            dependents: 0,
        }
    }

    #[test]
    fn withdrawals_always_include_rmds() {
        let mut buckets = AccountBuckets::new();
        buckets.set_balance(BucketKind::IraTraditional, dec!(800000));
        let household = Household { age1: 75, ..household() };
        let needs = Needs { target_spending: dec!(10000), ..Default::default() };
        let options = WithdrawalOptions::default();
        let plan = optimize(&buckets, &needs, &household, &options, &tables());
        let total_withdrawals: Decimal = plan.withdrawals.values().copied().sum();
        let total_rmds: Decimal = plan.rmds.values().copied().sum();
        assert!(total_withdrawals >= total_rmds);
        assert!(total_rmds > Decimal::ZERO);
    }

    #[test]
    fn roth_withdrawal_is_zero_when_disallowed() {
        let mut buckets = AccountBuckets::new();
        buckets.set_balance(BucketKind::IraRoth, dec!(200000));
        let needs = Needs { target_spending: dec!(500000), ..Default::default() };
        let options = WithdrawalOptions { allow_roth_withdrawals: false, ..WithdrawalOptions::default() };
        let plan = optimize(&buckets, &needs, &household(), &options, &tables());
        assert_eq!(plan.withdrawals.get(&BucketKind::IraRoth).copied().unwrap_or(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn qcd_never_exceeds_cap_or_rmd() {
        let mut buckets = AccountBuckets::new();
        buckets.set_balance(BucketKind::IraTraditional, dec!(800000));
        let household = Household { age1: 75, ..household() };
        let needs = Needs::default();
        let options = WithdrawalOptions { charitable_giving: dec!(200000), ..WithdrawalOptions::default() };
        let plan = optimize(&buckets, &needs, &household, &options, &tables());
        assert!(plan.qcd_used <= QCD_ANNUAL_CAP);
        let rmd = plan.rmds.get(&BucketKind::IraTraditional).copied().unwrap_or(Decimal::ZERO);
        assert!(plan.qcd_used <= rmd);
    }

    #[test]
    fn no_bucket_is_drawn_below_zero() {
        let mut buckets = AccountBuckets::new();
        buckets.set_balance(BucketKind::Taxable, dec!(1000));
        let needs = Needs { target_spending: dec!(1_000_000), ..Default::default() };
        let options = WithdrawalOptions { allow_roth_withdrawals: true, ..WithdrawalOptions::default() };
        let plan = optimize(&buckets, &needs, &household(), &options, &tables());
        let taxable_drawn = plan.withdrawals.get(&BucketKind::Taxable).copied().unwrap_or(Decimal::ZERO);
        assert!(taxable_drawn <= dec!(1000));
    }

    #[test]
    fn shortfall_is_zero_when_balances_cover_need_and_roth_allowed() {
        let mut buckets = AccountBuckets::new();
        buckets.set_balance(BucketKind::Taxable, dec!(50000));
        buckets.set_balance(BucketKind::IraRoth, dec!(50000));
        let needs = Needs { target_spending: dec!(80000), ..Default::default() };
        let options = WithdrawalOptions { allow_roth_withdrawals: true, ..WithdrawalOptions::default() };
        let plan = optimize(&buckets, &needs, &household(), &options, &tables());
        assert_eq!(plan.shortfall, Decimal::ZERO);
    }

    #[test]
    fn taxable_embedded_gain_fraction_scales_tax_loss_harvested() {
        let needs = Needs { target_spending: dec!(100_000), ..Default::default() };
        let options = WithdrawalOptions { tax_loss_harvest_available: dec!(1_000_000), ..WithdrawalOptions::default() };

        let mut low_gain = AccountBuckets::new();
        low_gain.set_balance(BucketKind::Taxable, dec!(500_000));
        low_gain.taxable_embedded_gain_fraction = 0.10;
        let low_plan = optimize(&low_gain, &needs, &household(), &options, &tables());

        let mut high_gain = AccountBuckets::new();
        high_gain.set_balance(BucketKind::Taxable, dec!(500_000));
        high_gain.taxable_embedded_gain_fraction = 0.50;
        let high_plan = optimize(&high_gain, &needs, &household(), &options, &tables());

        assert!(high_plan.tax_loss_harvested > low_plan.tax_loss_harvested);
    }
}
