//! Monte Carlo Orchestrator (spec component H): runs the Projection Driver
//! N times over independent, correlated return paths, aggregates the
//! terminal distribution.
//!
//! Grounded in `src/bin/run_block.rs`'s
//! `policies.par_iter().map(|policy| project_policy(...)).collect()`
//! pattern, generalized from one-projection-per-policy to
//! one-projection-per-Monte-Carlo-path.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::TaxTables;
use crate::error::{CoreError, CoreResult};
use crate::projection::engine::{ProjectionConfig, ProjectionEngine};
use crate::scenario::Scenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub n_paths: u64,
    pub horizon_months: u32,
    pub success_rate: f64,
    pub median_terminal: Decimal,
    pub p5_terminal: Decimal,
    pub p95_terminal: Decimal,
    pub average_ending: Decimal,
    pub p_depleted: f64,
    pub p_doubled: f64,
    pub p_preserved: f64,
    pub paths_failed: u64,
    pub duration: Duration,
    /// Mean months-lasted across all paths, retained per path alongside
    /// terminal value and the depleted flag per spec.md §4.H.
    pub average_months_survived: f64,
}

struct PathOutcome {
    terminal_value: Decimal,
    depleted: bool,
    months_survived: u32,
}

pub struct Orchestrator {
    scenario: Scenario,
    tables: TaxTables,
}

impl Orchestrator {
    pub fn new(scenario: Scenario, tables: TaxTables) -> Self {
        Orchestrator { scenario, tables }
    }

    /// `Simulate(scenario, N, horizonMonths) -> SimulationResult`.
    /// Paths run in parallel via `rayon`; a progress callback, if given, is
    /// invoked every 1,000 completed paths and must not block a worker — it
    /// is driven off an atomic counter, not a lock. `cancel`, if given, is
    /// checked at the start of each path and at each path's month
    /// boundaries; a set flag ends the run promptly with
    /// [`CoreError::Cancelled`].
    pub fn simulate(
        &self,
        n_paths: u64,
        progress: Option<Box<dyn Fn(u64, u64) + Send + Sync>>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> CoreResult<SimulationResult> {
        let start = Instant::now();
        let horizon_months = self.scenario.assumptions.horizon_months;
        let config = ProjectionConfig {
            horizon_months,
            detailed_output: false,
        };
        let engine = ProjectionEngine::new(self.scenario.clone(), self.tables.clone(), config);
        let base_seed = self.scenario.assumptions.seed;
        let completed = Arc::new(AtomicU64::new(0));
        let failed = Arc::new(AtomicU64::new(0));

        let outcomes: Vec<Option<PathOutcome>> = (0..n_paths)
            .into_par_iter()
            .map(|path_index| {
                if let Some(flag) = &cancel {
                    if flag.load(Ordering::Relaxed) {
                        return None;
                    }
                }
                let seed = base_seed ^ path_index;
                let outcome = match engine.run(Some(seed), cancel.as_deref()) {
                    Ok(result) => Some(PathOutcome {
                        terminal_value: result.terminal_value,
                        depleted: result.depleted,
                        months_survived: result.months_survived,
                    }),
                    Err(CoreError::Cancelled) => None,
                    Err(err) => {
                        log::warn!("path {path_index} failed: {err}");
                        failed.fetch_add(1, Ordering::Relaxed);
                        None
                    }
                };

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(cb) = &progress {
                    if done % 1000 == 0 {
                        cb(done, n_paths);
                    }
                }
                outcome
            })
            .collect();

        if let Some(flag) = &cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(CoreError::Cancelled);
            }
        }

        let failed_count = failed.load(Ordering::Relaxed);
        if failed_count as f64 / n_paths as f64 > 0.01 {
            return Err(CoreError::NumericDegeneracy {
                path_index: 0,
                month_index: 0,
                detail: format!("{failed_count} of {n_paths} paths failed numerically, exceeding the 1% tolerance"),
            });
        }

        // Failed paths are replaced with a depleted outcome per spec.md §7.
        let starting_balance = self.scenario.buckets.total();
        let resolved: Vec<PathOutcome> = outcomes
            .into_iter()
            .map(|o| {
                o.unwrap_or(PathOutcome { terminal_value: Decimal::ZERO, depleted: true, months_survived: 0 })
            })
            .collect();

        let mut terminals: Vec<Decimal> = resolved.iter().map(|o| o.terminal_value).collect();
        terminals.sort();

        let n = terminals.len();
        let success_count = resolved.iter().filter(|o| !o.depleted).count();
        let depleted_count = resolved.iter().filter(|o| o.depleted).count();
        let doubled_count = resolved
            .iter()
            .filter(|o| o.terminal_value > starting_balance * Decimal::from(2))
            .count();
        let preserved_count = resolved.iter().filter(|o| o.terminal_value > starting_balance).count();

        let percentile = |p: f64| -> Decimal {
            if n == 0 {
                return Decimal::ZERO;
            }
            let rank = ((p * n as f64).floor() as usize).min(n - 1);
            terminals[rank]
        };

        let average_ending = if n > 0 {
            terminals.iter().copied().sum::<Decimal>() / Decimal::from(n as u64)
        } else {
            Decimal::ZERO
        };
        let average_months_survived = if n > 0 {
            resolved.iter().map(|o| o.months_survived as f64).sum::<f64>() / n as f64
        } else {
            0.0
        };

        Ok(SimulationResult {
            n_paths,
            horizon_months,
            success_rate: success_count as f64 / n.max(1) as f64,
            median_terminal: percentile(0.50),
            p5_terminal: percentile(0.05),
            p95_terminal: percentile(0.95),
            average_ending,
            p_depleted: depleted_count as f64 / n.max(1) as f64,
            p_doubled: doubled_count as f64 / n.max(1) as f64,
            p_preserved: preserved_count as f64 / n.max(1) as f64,
            paths_failed: failed_count,
            duration: start.elapsed(),
            average_months_survived,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflow::CashFlowStream;
    use crate::household::{AccountBuckets, BucketKind, FilingStatus, Household, WithdrawalOptions};
    use crate::scenario::Assumptions;
    use chrono::NaiveDate;

    fn scenario(seed: u64, horizon_months: u32) -> Scenario {
        let mut buckets = AccountBuckets::new();
        buckets.set_balance(BucketKind::Taxable, Decimal::from(1_000_000));
        Scenario {
            household: Household {
                state: "AZ".to_string(),
                filing_status: FilingStatus::MarriedJoint,
                age1: 65,
                age2: Some(64),
                dependents: 0,
            },
            buckets,
            streams: Vec::<CashFlowStream>::new(),
            withdrawal_options: WithdrawalOptions::default(),
            assumptions: Assumptions {
                valuation_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                inflation_rate: 0.03,
                healthcare_inflation_rate: 0.05,
                horizon_months,
                tax_alpha: 0.0,
                tax_year: 2024,
                scalar_mean: 0.07,
                scalar_vol: 0.18,
                return_model: None,
                stock_bond_allocation: 0.6,
                seed,
            },
            target_spending: Decimal::ZERO,
        }
    }

    #[test]
    fn percentiles_are_ordered() {
        let tables = TaxTables::for_year(2024).unwrap();
        let orchestrator = Orchestrator::new(scenario(42, 120), tables);
        let result = orchestrator.simulate(200, None, None).unwrap();
        assert!(result.p5_terminal <= result.median_terminal);
        assert!(result.median_terminal <= result.p95_terminal);
    }

    #[test]
    fn positive_return_no_withdrawal_preserves_majority_of_paths() {
        let tables = TaxTables::for_year(2024).unwrap();
        let orchestrator = Orchestrator::new(scenario(7, 360), tables);
        let result = orchestrator.simulate(300, None, None).unwrap();
        assert!(result.p_preserved > 0.5);
    }

    #[test]
    fn same_seed_reproduces_identical_summary() {
        let tables_a = TaxTables::for_year(2024).unwrap();
        let tables_b = TaxTables::for_year(2024).unwrap();
        let a = Orchestrator::new(scenario(42, 120), tables_a).simulate(100, None, None).unwrap();
        let b = Orchestrator::new(scenario(42, 120), tables_b).simulate(100, None, None).unwrap();
        assert_eq!(a.success_rate, b.success_rate);
        assert_eq!(a.median_terminal, b.median_terminal);
    }

    #[test]
    fn cancellation_flag_ends_the_run_promptly() {
        let tables = TaxTables::for_year(2024).unwrap();
        let orchestrator = Orchestrator::new(scenario(42, 360), tables);
        let cancel = Arc::new(AtomicBool::new(true));
        let err = orchestrator.simulate(500, None, Some(cancel)).unwrap_err();
        assert!(matches!(err, CoreError::Cancelled));
    }
}
