//! Per-run mutable state for the Projection Driver.
//!
//! Generalizes the teacher's `ProjectionState` (per-policy month/age/balance
//! tracking with an `advance_month` mutator) into a per-household balance
//! and calendar tracker.

use chrono::{Datelike, NaiveDate};

use crate::household::AccountBuckets;

#[derive(Debug, Clone)]
pub struct ProjectionState {
    pub month_index: u32,
    pub month_date: NaiveDate,
    pub age1: u32,
    pub age2: Option<u32>,
    pub buckets: AccountBuckets,
    pub depleted: bool,
}

impl ProjectionState {
    pub fn new(start_date: NaiveDate, age1: u32, age2: Option<u32>, buckets: AccountBuckets) -> Self {
        ProjectionState {
            month_index: 0,
            month_date: start_date,
            age1,
            age2,
            buckets,
            depleted: false,
        }
    }

    /// Whether `month_index` is a December row (year-end sequencer
    /// invocation boundary): `month_index % 12 == 11`.
    pub fn is_year_end(&self) -> bool {
        self.month_index % 12 == 11
    }

    /// Advance the calendar and age trackers by one month. Ages increment
    /// once per 12 months elapsed since the projection start, matching the
    /// teacher's `attained_age()` whole-year convention.
    pub fn advance_month(&mut self) {
        self.month_index += 1;
        self.month_date = add_month(self.month_date);
        if self.month_index % 12 == 0 {
            self.age1 += 1;
            self.age2 = self.age2.map(|a| a + 1);
        }
        self.depleted = self.buckets.total() <= rust_decimal::Decimal::ZERO;
    }
}

fn add_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}
