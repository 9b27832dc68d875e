//! Projection Driver (spec component G): the monthly time-stepping loop.
//!
//! Generalizes the teacher's `ProjectionEngine::project_policy` — construct
//! once with assumptions + config, loop month by month mutating a state
//! struct, call out to sub-steps, emit one row per month — from an annuity
//! decrement projection into the cash-flow / withdrawal / tax / growth loop
//! spec.md §4.G specifies.

use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::assumptions::TaxTables;
use crate::cashflow::aggregate_month;
use crate::error::{CoreError, CoreResult};
use crate::household::{BucketKind, Needs};
use crate::projection::rows::{ProjectionResult, RunStatus, TimeSeriesRow};
use crate::projection::state::ProjectionState;
use crate::returns::deterministic::DeterministicReturns;
use crate::returns::stochastic::StochasticReturns;
use crate::returns::synthetic::SyntheticReturns;
use crate::returns::ReturnGenerator;
use crate::scenario::Scenario;
use crate::sequencer::optimize;

#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    pub horizon_months: u32,
    /// Whether to retain the full per-month row stream. The Monte Carlo
    /// orchestrator sets this `false` to bound memory (spec.md §4.H:
    /// "discard monthly rows ... retain only terminal value, depleted
    /// flag, and months-lasted").
    pub detailed_output: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig {
            horizon_months: 360,
            detailed_output: true,
        }
    }
}

pub struct ProjectionEngine {
    scenario: Scenario,
    tables: TaxTables,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(scenario: Scenario, tables: TaxTables, config: ProjectionConfig) -> Self {
        ProjectionEngine { scenario, tables, config }
    }

    /// Build the return generator for this run. `path_seed_override` lets
    /// the Monte Carlo orchestrator supply `base_seed ^ path_index`; `None`
    /// uses the scenario's own seed for a single deterministic/reference
    /// run.
    fn build_return_generator(&self, path_seed_override: Option<u64>) -> Box<dyn ReturnGenerator> {
        let seed = path_seed_override.unwrap_or(self.scenario.assumptions.seed);
        match (&self.scenario.assumptions.return_model, path_seed_override) {
            (Some(model), Some(_)) => Box::new(StochasticReturns::new(model.clone(), seed)),
            (Some(model), None) => {
                // The reference/deterministic path ignores the stochastic
                // model and uses the scalar mean, per spec.md §4.F.
                let _ = model;
                Box::new(DeterministicReturns::new(self.scenario.assumptions.scalar_mean))
            }
            (None, Some(_)) => Box::new(SyntheticReturns::new(
                self.scenario.assumptions.scalar_mean,
                self.scenario.assumptions.scalar_vol,
                seed,
            )),
            (None, None) => Box::new(DeterministicReturns::new(self.scenario.assumptions.scalar_mean)),
        }
    }

    /// Run the full horizon once. `path_seed_override` is `Some(seed)` for
    /// a Monte Carlo path, `None` for the single deterministic reference
    /// run. `cancel`, if given, is checked at every month boundary; a set
    /// flag ends the run immediately with [`CoreError::Cancelled`].
    pub fn run(&self, path_seed_override: Option<u64>, cancel: Option<&AtomicBool>) -> CoreResult<ProjectionResult> {
        let mut state = ProjectionState::new(
            self.scenario.assumptions.valuation_date,
            self.scenario.household.age1,
            self.scenario.household.age2,
            self.scenario.buckets.clone(),
        );
        let mut return_generator = self.build_return_generator(path_seed_override);
        let mut result = ProjectionResult::new();
        result.status = RunStatus::Running;

        let mut year_income_accum = Decimal::ZERO;
        let mut year_ordinary_income_accum = Decimal::ZERO;
        let mut year_expense_accum = Decimal::ZERO;

        for month in 0..self.config.horizon_months {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(CoreError::Cancelled);
                }
            }

            let flow = aggregate_month(
                &self.scenario.streams,
                month as i32,
                self.scenario.assumptions.valuation_date,
                self.scenario.assumptions.inflation_rate,
            );
            year_income_accum += flow.income;
            year_expense_accum += flow.expenses;
            // Only streams tagged as ordinary/SS count toward "other income"
            // that offsets the sequencer's spending gap; this simplified
            // core treats all non-LTCG/tax-free income streams as ordinary
            // for that purpose, consistent with spec.md §4.G's
            // "annualOrdinaryIncome" framing.
            year_ordinary_income_accum += flow.income;

            let mut row = TimeSeriesRow::new(state.month_index, state.month_date, state.age1, state.age2);
            row.total_income = flow.income;
            row.total_expenses = flow.expenses;
            row.net_cash_flow = flow.income - flow.expenses;

            if row.net_cash_flow > Decimal::ZERO {
                state.buckets.deposit(BucketKind::Taxable, row.net_cash_flow);
            }

            if state.is_year_end() {
                let target_spending = (year_expense_accum - year_ordinary_income_accum).max(Decimal::ZERO)
                    + self.scenario.target_spending;
                let needs = Needs {
                    target_spending,
                    social_security: Decimal::ZERO,
                    pension: Decimal::ZERO,
                    other_income: year_income_accum,
                };
                let plan = optimize(
                    &state.buckets,
                    &needs,
                    &self.scenario.household,
                    &self.scenario.withdrawal_options,
                    &self.tables,
                );

                for (kind, amount) in plan.withdrawals.iter() {
                    let drawn = state.buckets.withdraw(*kind, *amount);
                    row.withdrawals.insert(*kind, drawn);
                }
                row.total_withdrawals = plan.withdrawals.values().copied().sum();

                if plan.roth_conversion.amount > Decimal::ZERO {
                    let moved = state.buckets.withdraw(BucketKind::IraTraditional, plan.roth_conversion.amount);
                    state.buckets.deposit(BucketKind::IraRoth, moved);
                }

                row.federal_tax = plan.tax_result.federal_tax;
                row.state_tax = plan.tax_result.state_tax;
                row.irmaa_surcharge = plan.tax_result.irmaa.total_annual;
                row.niit_tax = plan.tax_result.niit;
                row.total_tax = plan.tax_result.total_tax;
                if row.total_tax > state.buckets.balance(BucketKind::Taxable) {
                    row.notes.push_str("tax liability exceeds available taxable cash; ");
                }
                state.buckets.withdraw(BucketKind::Taxable, row.total_tax);

                if plan.shortfall > Decimal::ZERO {
                    row.notes
                        .push_str(&format!("shortfall of {} against spending need; ", plan.shortfall));
                }

                year_income_accum = Decimal::ZERO;
                year_ordinary_income_accum = Decimal::ZERO;
                year_expense_accum = Decimal::ZERO;
            }

            let monthly_return = return_generator.monthly_return(month);
            let tax_alpha_monthly = self.scenario.assumptions.tax_alpha / 12.0;
            let total_monthly_return = monthly_return + tax_alpha_monthly;

            if !total_monthly_return.is_finite() {
                return Err(CoreError::NumericDegeneracy {
                    path_index: path_seed_override.unwrap_or(0),
                    month_index: month,
                    detail: "non-finite monthly return".to_string(),
                });
            }

            for kind in [
                BucketKind::Taxable,
                BucketKind::IraTraditional,
                BucketKind::Employer401kTraditional,
                BucketKind::IraRoth,
                BucketKind::Hsa,
            ] {
                let before = state.buckets.balance(kind);
                if before <= Decimal::ZERO {
                    continue;
                }
                let growth = before * Decimal::from_f64(total_monthly_return).unwrap_or(Decimal::ZERO);
                row.growth.insert(kind, growth);
                state.buckets.set_balance(kind, (before + growth).round_dp(2));
            }

            for kind in [
                BucketKind::Taxable,
                BucketKind::IraTraditional,
                BucketKind::Employer401kTraditional,
                BucketKind::IraRoth,
                BucketKind::Hsa,
            ] {
                row.balances.insert(kind, state.buckets.balance(kind));
            }

            let depleted_this_month = state.buckets.total() <= Decimal::ZERO;
            if depleted_this_month {
                row.notes.push_str("depleted; ");
            }

            if self.config.detailed_output {
                result.add_row(row);
            } else {
                result.record_month(&row);
            }

            state.advance_month();
        }

        result.depleted = state.buckets.total() <= dec!(0.01);
        result.status = RunStatus::Succeeded;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflow::CashFlowStream;
    use crate::household::{AccountBuckets, BucketKind, FilingStatus, Household, WithdrawalOptions};
    use crate::scenario::Assumptions;
    use chrono::NaiveDate;
    use std::sync::atomic::AtomicBool;

    fn scenario(target_spending: Decimal, horizon_months: u32) -> Scenario {
        let mut buckets = AccountBuckets::new();
        buckets.set_balance(BucketKind::Taxable, Decimal::from(100_000));
        Scenario {
            household: Household {
                state: "TX".to_string(),
                filing_status: FilingStatus::Single,
                age1: 62,
                age2: None,
                dependents: 0,
            },
            buckets,
            streams: Vec::<CashFlowStream>::new(),
            withdrawal_options: WithdrawalOptions::default(),
            assumptions: Assumptions {
                valuation_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                inflation_rate: 0.0,
                healthcare_inflation_rate: 0.0,
                horizon_months,
                tax_alpha: 0.0,
                tax_year: 2024,
                scalar_mean: 0.0,
                scalar_vol: 0.0,
                return_model: None,
                stock_bond_allocation: 0.6,
                seed: 1,
            },
            target_spending,
        }
    }

    #[test]
    fn already_set_cancel_flag_stops_before_the_first_month() {
        let tables = TaxTables::for_year(2024).unwrap();
        let config = ProjectionConfig { horizon_months: 120, detailed_output: true };
        let engine = ProjectionEngine::new(scenario(dec!(50_000), 120), tables, config);
        let cancel = AtomicBool::new(true);
        let err = engine.run(None, Some(&cancel)).unwrap_err();
        assert!(matches!(err, CoreError::Cancelled));
    }

    #[test]
    fn months_survived_freezes_at_first_depletion() {
        let tables = TaxTables::for_year(2024).unwrap();
        // $100k balance, $200k/yr spend with no growth: depletes partway
        // through the horizon, then stays at zero for the remaining months.
        let config = ProjectionConfig { horizon_months: 60, detailed_output: true };
        let engine = ProjectionEngine::new(scenario(dec!(200_000), 60), tables, config);
        let result = engine.run(None, None).unwrap();
        assert!(result.depleted);
        assert!(result.months_survived < 60, "expected depletion before the horizon ends");
        assert_eq!(result.rows.len(), 60, "rows keep emitting through the full horizon");
    }
}
