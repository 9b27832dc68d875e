//! `TimeSeriesRow`: one emitted row per projected month, plus
//! `ProjectionResult`, the row stream for one deterministic or single Monte
//! Carlo path.
//!
//! Generalizes the teacher's `CashflowRow`/`ProjectionResult` pair in
//! `projection/cashflows.rs` from per-policy annuity cashflow fields to the
//! per-household balance/income/tax fields spec.md §3 names.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::household::BucketKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub month_index: u32,
    pub month_date: NaiveDate,

    pub balances: HashMap<BucketKind, Decimal>,
    pub contributions: HashMap<BucketKind, Decimal>,
    pub withdrawals: HashMap<BucketKind, Decimal>,
    pub growth: HashMap<BucketKind, Decimal>,

    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_cash_flow: Decimal,
    pub total_withdrawals: Decimal,

    /// Populated in December rows only; zero in other months.
    pub federal_tax: Decimal,
    pub state_tax: Decimal,
    pub irmaa_surcharge: Decimal,
    pub niit_tax: Decimal,
    pub total_tax: Decimal,

    pub age1: u32,
    pub age2: Option<u32>,

    pub notes: String,
}

impl TimeSeriesRow {
    pub fn new(month_index: u32, month_date: NaiveDate, age1: u32, age2: Option<u32>) -> Self {
        TimeSeriesRow {
            month_index,
            month_date,
            balances: HashMap::new(),
            contributions: HashMap::new(),
            withdrawals: HashMap::new(),
            growth: HashMap::new(),
            total_income: Decimal::ZERO,
            total_expenses: Decimal::ZERO,
            net_cash_flow: Decimal::ZERO,
            total_withdrawals: Decimal::ZERO,
            federal_tax: Decimal::ZERO,
            state_tax: Decimal::ZERO,
            irmaa_surcharge: Decimal::ZERO,
            niit_tax: Decimal::ZERO,
            total_tax: Decimal::ZERO,
            age1,
            age2,
            notes: String::new(),
        }
    }

    pub fn total_balance(&self) -> Decimal {
        self.balances.values().copied().sum()
    }
}

/// Explicit run state machine per spec.md §4.G:
/// `idle -> running -> succeeded | failed | cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Idle,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub rows: Vec<TimeSeriesRow>,
    pub status: RunStatus,
    pub depleted: bool,
    pub months_survived: u32,
    pub terminal_value: Decimal,
    /// Set once the household first runs out of money; freezes
    /// `months_survived` against later rows (the horizon keeps emitting
    /// rows at a zero balance after depletion).
    #[serde(skip, default)]
    months_survived_frozen: bool,
}

impl ProjectionResult {
    pub fn new() -> Self {
        ProjectionResult {
            rows: Vec::new(),
            status: RunStatus::Idle,
            depleted: false,
            months_survived: 0,
            terminal_value: Decimal::ZERO,
            months_survived_frozen: false,
        }
    }

    /// Update `terminal_value`/`months_survived` for one projected month
    /// without retaining the row. Used by both `add_row` and the Monte
    /// Carlo orchestrator's undetailed-output path.
    pub fn record_month(&mut self, row: &TimeSeriesRow) {
        self.terminal_value = row.total_balance();
        if !self.months_survived_frozen {
            self.months_survived = row.month_index + 1;
            if row.total_balance() <= Decimal::ZERO {
                self.months_survived_frozen = true;
            }
        }
    }

    pub fn add_row(&mut self, row: TimeSeriesRow) {
        self.record_month(&row);
        self.rows.push(row);
    }
}

impl Default for ProjectionResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_row_updates_terminal_value_and_months_survived() {
        let mut result = ProjectionResult::new();
        let mut row = TimeSeriesRow::new(0, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 65, None);
        row.balances.insert(BucketKind::Taxable, Decimal::from(1000));
        result.add_row(row);
        assert_eq!(result.terminal_value, Decimal::from(1000));
        assert_eq!(result.months_survived, 1);
    }
}
