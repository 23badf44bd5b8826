//! Financial record aggregation for the dashboard.
//!
//! Sums income and expenses overall and per calendar month. All arithmetic is
//! done with checked [Decimal] operations so totals never pick up floating
//! point error and never wrap or panic.

use std::{collections::BTreeMap, fmt::Display};

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use time::Date;

use crate::{
    Error,
    financial_record::{FinancialRecord, RecordKind},
};

/// A calendar month, serialized as "YYYY-MM".
///
/// Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u8,
}

impl MonthKey {
    /// The month that `date` falls in.
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: u8::from(date.month()),
        }
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// The income and expenses of a single month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthlyTotals {
    #[serde(with = "crate::decimal_format")]
    pub income: Decimal,
    #[serde(with = "crate::decimal_format")]
    pub expense: Decimal,
}

/// Totals over a set of financial records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    /// The sum of all income.
    #[serde(with = "crate::decimal_format")]
    pub total_income: Decimal,
    /// The sum of all expenses.
    #[serde(with = "crate::decimal_format")]
    pub total_expense: Decimal,
    /// Income minus expenses, negative if more was spent than earned.
    #[serde(with = "crate::decimal_format")]
    pub net: Decimal,
    /// Income and expenses per month of the record's (start) date, oldest month first.
    pub monthly: BTreeMap<MonthKey, MonthlyTotals>,
}

/// Summarize `records` into overall and monthly totals.
///
/// Records that cover a date range are counted in full in the month of their
/// start date.
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if a total does not fit in a [Decimal].
pub fn summarize(records: &[FinancialRecord]) -> Result<FinancialSummary, Error> {
    let mut summary = FinancialSummary::default();

    for record in records {
        let month = summary
            .monthly
            .entry(MonthKey::from_date(record.date))
            .or_default();

        match record.kind {
            RecordKind::Income => {
                add_to(&mut summary.total_income, record.amount)?;
                add_to(&mut month.income, record.amount)?;
            }
            RecordKind::Expense => {
                add_to(&mut summary.total_expense, record.amount)?;
                add_to(&mut month.expense, record.amount)?;
            }
        }
    }

    summary.net = summary
        .total_income
        .checked_sub(summary.total_expense)
        .ok_or(Error::AmountOverflow)?;

    Ok(summary)
}

fn add_to(total: &mut Decimal, amount: Decimal) -> Result<(), Error> {
    *total = total.checked_add(amount).ok_or(Error::AmountOverflow)?;

    Ok(())
}
