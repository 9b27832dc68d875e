//! IRS Uniform Lifetime Table: age → distribution-period factor.
//!
//! Structured the way the teacher's `assumptions::pwd::RmdTable` embeds its
//! own age-keyed factor table — a sorted `Vec<(u8, f64)>` with a lookup that
//! clamps to the last entry for ages beyond the table. The factors
//! themselves are the IRS Uniform Lifetime Table values, a different scale
//! than the teacher's annuity-specific partial-withdrawal factors.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RmdTable {
    /// `(age, distribution_period_factor)`, ages 73..=100, ascending.
    factors: Vec<(u8, f64)>,
}

impl RmdTable {
    /// Build a table from explicit `(age, factor)` rows, used by the CSV
    /// override loader in `assumptions::mod`.
    pub fn from_rows(factors: Vec<(u8, f64)>) -> Self {
        RmdTable { factors }
    }

    /// The distribution-period factor for `age`. Ages below 73 have no
    /// entry; callers must gate on age before calling. Ages above 100 clamp
    /// to the age-100 factor.
    pub fn factor_for_age(&self, age: u32) -> Option<f64> {
        if age < 73 {
            return None;
        }
        let age = age.min(100) as u8;
        self.factors
            .iter()
            .find(|(a, _)| *a == age)
            .map(|(_, f)| *f)
    }
}

/// IRS Uniform Lifetime Table (2024 edition), ages 73 through 100.
pub fn uniform_lifetime_table() -> RmdTable {
    let factors = vec![
        (73, 26.5), (74, 25.5), (75, 24.6), (76, 23.7), (77, 22.9),
        (78, 22.0), (79, 21.1), (80, 20.2), (81, 19.4), (82, 18.5),
        (83, 17.7), (84, 16.8), (85, 16.0), (86, 15.2), (87, 14.4),
        (88, 13.7), (89, 12.9), (90, 12.2), (91, 11.5), (92, 10.8),
        (93, 10.1), (94, 9.5), (95, 8.9), (96, 8.4), (97, 7.8),
        (98, 7.3), (99, 6.8), (100, 6.4),
    ];
    RmdTable { factors }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_73_has_no_factor() {
        let table = uniform_lifetime_table();
        assert_eq!(table.factor_for_age(72), None);
    }

    #[test]
    fn exact_ages_match_irs_table() {
        let table = uniform_lifetime_table();
        assert_eq!(table.factor_for_age(73), Some(26.5));
        assert_eq!(table.factor_for_age(100), Some(6.4));
    }

    #[test]
    fn ages_above_100_clamp_to_100() {
        let table = uniform_lifetime_table();
        assert_eq!(table.factor_for_age(110), Some(6.4));
    }
}
