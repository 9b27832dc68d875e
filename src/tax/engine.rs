//! Tax Engine (spec component B): `calculate_tax(income, household) ->
//! TaxResult`, a total, pure function composing the bracket tables (A).
//!
//! Grounded in `conman124-retirement/src/taxes.rs`'s bracket-walk shape and
//! `other_examples/522e2f3d_..._tax.rs.rs`'s `FederalTaxResult` output
//! structure, extended with the preferential-income stacking rule and the
//! IRMAA/NIIT layers spec.md §4.B calls for.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::TaxTables;
use crate::assumptions::irmaa::IrmaaResult;
use crate::household::{FilingStatus, Household, IncomeBreakdown};

/// Output of one `calculate_tax` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxResult {
    pub agi: Decimal,
    pub magi: Decimal,
    pub taxable_income: Decimal,
    pub federal_tax: Decimal,
    pub state_tax: Decimal,
    pub irmaa: IrmaaResult,
    pub niit: Decimal,
    pub total_tax: Decimal,
    pub effective_rate: f64,
    pub marginal_rate: f64,
}

/// The 2024 married-joint combined-income thresholds for Social Security
/// taxability, parameterized by filing status (the source's defect, fixed
/// per the Open Question resolution in DESIGN.md).
fn social_security_thresholds(status: FilingStatus) -> (Decimal, Decimal) {
    match status {
        FilingStatus::MarriedJoint => (dec!(32000), dec!(44000)),
        FilingStatus::MarriedSeparate => (dec!(0), dec!(0)),
        FilingStatus::Single | FilingStatus::HeadOfHousehold => (dec!(25000), dec!(34000)),
    }
}

/// Step 1: taxable portion of Social Security via the combined-income
/// formula. `agi_proxy` excludes the Social Security benefit itself.
fn taxable_social_security(social_security: Decimal, agi_proxy: Decimal, status: FilingStatus) -> Decimal {
    if social_security <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let (tier1, tier2) = social_security_thresholds(status);
    let combined_income = agi_proxy + social_security * dec!(0.5);

    let taxable = if combined_income <= tier1 {
        Decimal::ZERO
    } else if combined_income <= tier2 {
        let excess = combined_income - tier1;
        excess.min(social_security) * dec!(0.5)
    } else {
        let tier1_amount = (tier2 - tier1).min(social_security) * dec!(0.5);
        let excess_above_tier2 = combined_income - tier2;
        tier1_amount + excess_above_tier2 * dec!(0.85)
    };

    // The statutory formula caps taxable SS at 85% of the gross benefit
    // regardless of how large combined income grows.
    taxable.min(social_security * dec!(0.85)).max(Decimal::ZERO)
}

/// Step 6: federal tax with preferential income (LTCG + qualified
/// dividends) stacked on top of ordinary income.
fn federal_tax_with_stacking(
    taxable_income: Decimal,
    preferential_income: Decimal,
    tables: &TaxTables,
    status: FilingStatus,
) -> Decimal {
    let preferential_income = preferential_income.max(Decimal::ZERO).min(taxable_income.max(Decimal::ZERO));
    let ordinary_portion = (taxable_income - preferential_income).max(Decimal::ZERO);

    let federal = tables.federal_for(status);
    let ltcg = tables.ltcg_for(status);

    let tax_on_ordinary = federal.tax_owed(ordinary_portion);
    let tax_on_preferential = ltcg.tax_owed_stacked(ordinary_portion, preferential_income);
    tax_on_ordinary + tax_on_preferential
}

/// `CalculateTax(IncomeBreakdown, Household) -> TaxResult`. Total and pure;
/// never fails. Callers validate negative/NaN inputs at the scenario
/// boundary before this is invoked.
pub fn calculate_tax(income: &IncomeBreakdown, household: &Household, tables: &TaxTables) -> TaxResult {
    let status = household.filing_status;

    // Step 2 (partial): an AGI proxy excluding Social Security, used to
    // compute the taxable SS portion via the combined-income formula.
    let agi_proxy = income.ordinary_income + income.long_term_capital_gains + income.qualified_dividends;

    // Step 1.
    let taxable_ss = taxable_social_security(income.social_security, agi_proxy, status);

    // Step 2.
    let agi = agi_proxy + taxable_ss;

    // Step 3.
    let magi = agi + income.municipal_bond_interest + income.roth_distributions;

    // Step 4.
    let deduction = tables
        .standard_deduction_for(status)
        .total(household.members_65_or_older());

    // Step 5.
    let taxable_income = (agi - deduction).max(Decimal::ZERO);

    // Step 6.
    let preferential_income = income.long_term_capital_gains + income.qualified_dividends;
    let federal_tax = federal_tax_with_stacking(taxable_income, preferential_income, tables, status);

    // Step 7.
    let state_rule = tables.state_rules.rule_for(&household.state, status);
    let state_tax = state_rule.tax_owed(taxable_income);

    // Step 8.
    let irmaa = tables
        .irmaa_for(status)
        .surcharge(magi, household.medicare_eligible_members());

    // Step 9.
    let investment_income = income.long_term_capital_gains + income.qualified_dividends;
    let niit = crate::assumptions::niit::niit_owed(agi, investment_income, status);

    // Step 10.
    let total_tax = federal_tax + state_tax + irmaa.total_annual + niit;
    let effective_rate = if agi > Decimal::ZERO {
        (total_tax / agi).to_f64().unwrap_or(0.0)
    } else {
        0.0
    };
    let marginal_rate = tables.federal_for(status).marginal_rate(taxable_income);

    TaxResult {
        agi,
        magi,
        taxable_income,
        federal_tax,
        state_tax,
        irmaa,
        niit,
        total_tax,
        effective_rate,
        marginal_rate,
    }
}
