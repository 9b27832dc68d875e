//! Scenario payload and orchestration entry points (spec component §6
//! external interface 1).
//!
//! Generalizes the teacher's `ScenarioRunner` (pre-loaded assumptions,
//! `run`/`run_batch`/`run_scenarios`) into the scenario-payload + Assumptions
//! container consumed by the projection driver and Monte Carlo orchestrator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cashflow::CashFlowStream;
use crate::error::{CoreError, CoreResult};
use crate::household::{AccountBuckets, Household, WithdrawalOptions};
use crate::montecarlo::orchestrator::{Orchestrator, SimulationResult};
use crate::projection::engine::{ProjectionConfig, ProjectionEngine};
use crate::projection::rows::ProjectionResult;
use crate::returns::stochastic::ReturnModel;

/// Scenario-wide economic assumptions, immutable for the run (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assumptions {
    pub valuation_date: NaiveDate,
    pub inflation_rate: f64,
    pub healthcare_inflation_rate: f64,
    pub horizon_months: u32,
    /// Per-annum return uplift attributed to tax-aware management, applied
    /// monthly on top of returns. Kept for compatibility; exposed as an
    /// assumption rather than hard-coded, per spec.md §3.
    pub tax_alpha: f64,
    pub tax_year: u32,
    /// Scalar mean/volatility pair for the deterministic path and the
    /// synthetic fallback.
    pub scalar_mean: f64,
    pub scalar_vol: f64,
    /// Present only when a correlated multi-asset-class model is available.
    pub return_model: Option<ReturnModel>,
    pub stock_bond_allocation: f64,
    pub seed: u64,
}

/// The full input bundle for one projection or Monte Carlo run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub household: Household,
    pub buckets: AccountBuckets,
    pub streams: Vec<CashFlowStream>,
    pub withdrawal_options: WithdrawalOptions,
    pub assumptions: Assumptions,
    pub target_spending: Decimal,
}

/// Lower/upper bounds on scenario inputs, rejected at the boundary before
/// any computation runs.
const MAX_AGE: u32 = 120;
const MIN_HORIZON_MONTHS: u32 = 1;
const MAX_HORIZON_MONTHS: u32 = 1_200;
const MAX_PATHS: u64 = 1_000_000;

/// Reject malformed scenarios before any tax/projection/Monte Carlo code
/// runs. Every check here names a single offending field so a caller can
/// surface it directly to the advisor entering the data.
fn validate(scenario: &Scenario) -> CoreResult<()> {
    fn invalid(field: &str, reason: &str) -> CoreError {
        CoreError::InputValidation { field: field.to_string(), reason: reason.to_string() }
    }

    if scenario.household.age1 > MAX_AGE {
        return Err(invalid("household.age1", "must be between 0 and 120"));
    }
    if let Some(age2) = scenario.household.age2 {
        if age2 > MAX_AGE {
            return Err(invalid("household.age2", "must be between 0 and 120"));
        }
    }
    let state = scenario.household.state.as_str();
    if state.len() != 2 || !state.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(invalid("household.state", "must be a two-letter uppercase state code"));
    }

    for balance in scenario.buckets.balances.values() {
        if *balance < Decimal::ZERO {
            return Err(invalid("buckets.balances", "account balances must not be negative"));
        }
    }
    if scenario.target_spending < Decimal::ZERO {
        return Err(invalid("target_spending", "must not be negative"));
    }
    for stream in &scenario.streams {
        if stream.base_amount < Decimal::ZERO {
            return Err(invalid("streams[].base_amount", "must not be negative"));
        }
    }

    let options = &scenario.withdrawal_options;
    if options.charitable_giving < Decimal::ZERO
        || options.tax_loss_harvest_available < Decimal::ZERO
        || options.roth_conversion_budget < Decimal::ZERO
    {
        return Err(invalid(
            "withdrawal_options",
            "charitable_giving, tax_loss_harvest_available, and roth_conversion_budget must not be negative",
        ));
    }

    let horizon = scenario.assumptions.horizon_months;
    if !(MIN_HORIZON_MONTHS..=MAX_HORIZON_MONTHS).contains(&horizon) {
        return Err(invalid(
            "assumptions.horizon_months",
            "must be between 1 month and 100 years (1,200 months)",
        ));
    }

    Ok(())
}

fn validate_n_paths(n_paths: u64) -> CoreResult<()> {
    if !(1..=MAX_PATHS).contains(&n_paths) {
        return Err(CoreError::InputValidation {
            field: "n_paths".to_string(),
            reason: "must be between 1 and 1,000,000".to_string(),
        });
    }
    Ok(())
}

/// Run the deterministic (expected-value) path once, emitting a full
/// `TimeSeriesRow` stream.
pub fn run_deterministic(scenario: &Scenario) -> CoreResult<ProjectionResult> {
    validate(scenario)?;
    let tables = crate::assumptions::TaxTables::for_year(scenario.assumptions.tax_year)?;
    let config = ProjectionConfig {
        horizon_months: scenario.assumptions.horizon_months,
        detailed_output: true,
    };
    let engine = ProjectionEngine::new(scenario.clone(), tables, config);
    engine.run(None, None)
}

/// Run the Monte Carlo orchestrator over `n_paths` correlated return paths.
pub fn run_monte_carlo(
    scenario: &Scenario,
    n_paths: u64,
    progress: Option<Box<dyn Fn(u64, u64) + Send + Sync>>,
) -> CoreResult<SimulationResult> {
    validate(scenario)?;
    validate_n_paths(n_paths)?;
    let tables = crate::assumptions::TaxTables::for_year(scenario.assumptions.tax_year)?;
    let orchestrator = Orchestrator::new(scenario.clone(), tables);
    orchestrator.simulate(n_paths, progress, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::household::{BucketKind, FilingStatus};

    fn sample_scenario() -> Scenario {
        let mut buckets = AccountBuckets::new();
        buckets.set_balance(BucketKind::Taxable, Decimal::from(1_500_000));

        Scenario {
            household: Household {
                state: "AZ".to_string(),
                filing_status: FilingStatus::MarriedJoint,
                age1: 65,
                age2: Some(64),
                dependents: 0,
            },
            buckets,
            streams: vec![],
            withdrawal_options: WithdrawalOptions::default(),
            assumptions: Assumptions {
                valuation_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                inflation_rate: 0.03,
                healthcare_inflation_rate: 0.05,
                horizon_months: 24,
                tax_alpha: 0.0,
                tax_year: 2024,
                scalar_mean: 0.07,
                scalar_vol: 0.12,
                return_model: None,
                stock_bond_allocation: 0.6,
                seed: 42,
            },
            target_spending: Decimal::from(120_000),
        }
    }

    #[test]
    fn deterministic_run_produces_one_row_per_month() {
        let scenario = sample_scenario();
        let result = run_deterministic(&scenario).unwrap();
        assert_eq!(result.rows.len(), 24);
    }

    #[test]
    fn same_seed_monte_carlo_is_reproducible() {
        let scenario = sample_scenario();
        let a = run_monte_carlo(&scenario, 50, None).unwrap();
        let b = run_monte_carlo(&scenario, 50, None).unwrap();
        assert_eq!(a.success_rate, b.success_rate);
        assert_eq!(a.average_ending, b.average_ending);
    }

    #[test]
    fn out_of_range_age_is_rejected_before_projection() {
        let mut scenario = sample_scenario();
        scenario.household.age1 = 121;
        let err = run_deterministic(&scenario).unwrap_err();
        assert!(matches!(err, CoreError::InputValidation { field, .. } if field == "household.age1"));
    }

    #[test]
    fn malformed_state_code_is_rejected() {
        let mut scenario = sample_scenario();
        scenario.household.state = "Arizona".to_string();
        let err = run_deterministic(&scenario).unwrap_err();
        assert!(matches!(err, CoreError::InputValidation { field, .. } if field == "household.state"));
    }

    #[test]
    fn negative_balance_is_rejected() {
        let mut scenario = sample_scenario();
        scenario.buckets.set_balance(BucketKind::Taxable, Decimal::from(1_500_000));
        scenario.buckets.balances.insert(BucketKind::IraRoth, Decimal::from(-1));
        let err = run_deterministic(&scenario).unwrap_err();
        assert!(matches!(err, CoreError::InputValidation { field, .. } if field == "buckets.balances"));
    }

    #[test]
    fn horizon_outside_one_month_to_one_hundred_years_is_rejected() {
        let mut scenario = sample_scenario();
        scenario.assumptions.horizon_months = 0;
        let err = run_deterministic(&scenario).unwrap_err();
        assert!(matches!(err, CoreError::InputValidation { field, .. } if field == "assumptions.horizon_months"));
    }

    #[test]
    fn n_paths_above_one_million_is_rejected() {
        let scenario = sample_scenario();
        let err = run_monte_carlo(&scenario, 1_000_001, None).unwrap_err();
        assert!(matches!(err, CoreError::InputValidation { field, .. } if field == "n_paths"));
    }
}
