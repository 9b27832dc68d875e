//! Cash-Flow Aggregator (spec component E): rolls up income and expense
//! streams to a given month with inflation indexing.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Annual,
    OneTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCharacter {
    Ordinary,
    CapitalGains,
    TaxFree,
    SocialSecurity,
}

/// One recurring or one-time cash flow, income or expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowStream {
    pub base_amount: Decimal,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub growth_rate: f64,
    pub inflation_indexed: bool,
    /// `Some` for income streams; `None` for expense streams.
    pub tax_character: Option<TaxCharacter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyCashFlow {
    pub income: Decimal,
    pub expenses: Decimal,
}

fn months_between(start: NaiveDate, projection_start: NaiveDate) -> i32 {
    (start.year() - projection_start.year()) * 12 + (start.month() as i32 - projection_start.month() as i32)
}

/// `MonthlyCashFlow(streams, monthIndex, startDate, assumptions) ->
/// {income, expenses}`.
pub fn aggregate_month(
    streams: &[CashFlowStream],
    month_index: i32,
    projection_start: NaiveDate,
    inflation_rate: f64,
) -> MonthlyCashFlow {
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;

    for stream in streams {
        let effective_rate = if stream.inflation_indexed {
            inflation_rate
        } else {
            stream.growth_rate
        };
        let amount = stream_contribution(stream, month_index, projection_start, effective_rate);
        match stream.tax_character {
            Some(_) => income += amount,
            None => expenses += amount,
        }
    }

    MonthlyCashFlow { income, expenses }
}

/// Contribution of one stream at `month_index` (0-based, relative to
/// `projection_start`). Zero outside the stream's active window.
fn stream_contribution(
    stream: &CashFlowStream,
    month_index: i32,
    projection_start: NaiveDate,
    effective_rate: f64,
) -> Decimal {
    let start_month = months_between(stream.start_date, projection_start);
    let end_month = stream
        .end_date
        .map(|d| months_between(d, projection_start))
        .unwrap_or(i32::MAX);

    if month_index < start_month || month_index > end_month {
        return Decimal::ZERO;
    }

    let per_month_base = match stream.frequency {
        Frequency::Monthly => stream.base_amount,
        Frequency::Quarterly => stream.base_amount / dec!(3),
        Frequency::Annual => stream.base_amount / dec!(12),
        Frequency::OneTime => {
            if month_index == start_month {
                stream.base_amount
            } else {
                return Decimal::ZERO;
            }
        }
    };

    let years_since_start = ((month_index - start_month) as f64 / 12.0).floor();
    let growth_factor = (1.0 + effective_rate).powf(years_since_start);
    let growth_factor_decimal = Decimal::from_f64(growth_factor).unwrap_or(dec!(1));

    per_month_base * growth_factor_decimal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn stream_before_start_contributes_zero() {
        let stream = CashFlowStream {
            base_amount: dec!(1000),
            frequency: Frequency::Monthly,
            start_date: date(2026, 6),
            end_date: None,
            growth_rate: 0.0,
            inflation_indexed: false,
            tax_character: Some(TaxCharacter::Ordinary),
        };
        let flow = aggregate_month(&[stream], 0, date(2026, 1), 0.03);
        assert_eq!(flow.income, Decimal::ZERO);
    }

    #[test]
    fn monthly_stream_active_window_contributes_full_amount() {
        let stream = CashFlowStream {
            base_amount: dec!(1000),
            frequency: Frequency::Monthly,
            start_date: date(2026, 1),
            end_date: None,
            growth_rate: 0.0,
            inflation_indexed: false,
            tax_character: Some(TaxCharacter::Ordinary),
        };
        let flow = aggregate_month(&[stream], 0, date(2026, 1), 0.03);
        assert_eq!(flow.income, dec!(1000));
    }

    #[test]
    fn annual_stream_normalizes_to_per_month() {
        let stream = CashFlowStream {
            base_amount: dec!(12000),
            frequency: Frequency::Annual,
            start_date: date(2026, 1),
            end_date: None,
            growth_rate: 0.0,
            inflation_indexed: false,
            tax_character: None,
        };
        let flow = aggregate_month(&[stream], 0, date(2026, 1), 0.03);
        assert_eq!(flow.expenses, dec!(1000));
    }

    #[test]
    fn one_time_stream_contributes_only_at_start_month() {
        let stream = CashFlowStream {
            base_amount: dec!(5000),
            frequency: Frequency::OneTime,
            start_date: date(2026, 3),
            end_date: None,
            growth_rate: 0.0,
            inflation_indexed: false,
            tax_character: Some(TaxCharacter::TaxFree),
        };
        let at_start = aggregate_month(&[stream.clone()], 2, date(2026, 1), 0.0);
        let after_start = aggregate_month(&[stream], 3, date(2026, 1), 0.0);
        assert_eq!(at_start.income, dec!(5000));
        assert_eq!(after_start.income, Decimal::ZERO);
    }

    #[test]
    fn inflation_indexed_stream_grows_yearly() {
        let stream = CashFlowStream {
            base_amount: dec!(1000),
            frequency: Frequency::Monthly,
            start_date: date(2026, 1),
            end_date: None,
            growth_rate: 0.0,
            inflation_indexed: true,
            tax_character: None,
        };
        let year0 = aggregate_month(&[stream.clone()], 0, date(2026, 1), 0.10);
        let year1 = aggregate_month(&[stream], 12, date(2026, 1), 0.10);
        assert!(year1.expenses > year0.expenses);
    }
}
