//! Retirement and wealth projection engine for financial advisors.
//!
//! This library provides:
//! - A pure federal/state/IRMAA/NIIT/Social-Security tax engine
//! - An annual multi-phase withdrawal sequencer (RMDs, QCDs, harvesting,
//!   Roth conversions)
//! - A monthly time-stepping projection driver, replicated across a Monte
//!   Carlo orchestrator

pub mod assumptions;
pub mod cashflow;
pub mod error;
pub mod household;
pub mod montecarlo;
pub mod projection;
pub mod returns;
pub mod scenario;
pub mod sequencer;
pub mod tax;

pub use assumptions::TaxTables;
pub use error::{CoreError, CoreResult};
pub use household::{AccountBuckets, BucketKind, FilingStatus, Household, IncomeBreakdown, Needs, WithdrawalOptions};
pub use montecarlo::{Orchestrator, SimulationResult};
pub use projection::{ProjectionConfig, ProjectionEngine, ProjectionResult, RunStatus, TimeSeriesRow};
pub use scenario::{run_deterministic, run_monte_carlo, Assumptions, Scenario};
pub use sequencer::{optimize, WithdrawalPlan};
pub use tax::{calculate_tax, TaxResult};
