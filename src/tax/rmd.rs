//! RMD Calculator (spec component C): `required_distribution(age, balance)`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::assumptions::rmd::RmdTable;

/// Required minimum distribution for one bucket. Zero below age 73;
/// otherwise `balance / factor` using the IRS Uniform Lifetime Table.
pub fn required_distribution(age: u32, balance: Decimal, table: &RmdTable) -> Decimal {
    if balance <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match table.factor_for_age(age) {
        None => Decimal::ZERO,
        Some(factor) => {
            let factor = Decimal::from_f64(factor).unwrap_or(dec!(1));
            balance / factor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::rmd::uniform_lifetime_table;

    #[test]
    fn below_73_owes_zero() {
        let table = uniform_lifetime_table();
        assert_eq!(required_distribution(70, dec!(500000), &table), Decimal::ZERO);
    }

    #[test]
    fn age_73_divides_by_26_5() {
        let table = uniform_lifetime_table();
        let rmd = required_distribution(73, dec!(800000), &table);
        // 800000 / 26.5 ≈ 30188.68
        assert!(rmd > dec!(30000) && rmd < dec!(30300));
    }

    #[test]
    fn zero_balance_owes_zero() {
        let table = uniform_lifetime_table();
        assert_eq!(required_distribution(80, Decimal::ZERO, &table), Decimal::ZERO);
    }

    #[test]
    fn ages_beyond_100_use_clamped_factor() {
        let table = uniform_lifetime_table();
        let at_100 = required_distribution(100, dec!(100000), &table);
        let at_110 = required_distribution(110, dec!(100000), &table);
        assert_eq!(at_100, at_110);
    }
}
