//! Pure aggregation over a user's ledger rows.
//!
//! These functions turn already-fetched transaction rows into the dashboard's
//! derived views: overall and current-month totals, month buckets, day buckets
//! for the current week, and per-category breakdowns. They perform no I/O and
//! do not trust the store to have filtered correctly. The date math in this
//! module is the source of truth for what counts as "this month" and
//! "this week".
//!
//! Amounts arrive as the raw text stored in the database and are coerced to
//! [Decimal] here. A row whose amount does not parse aborts the computation
//! with [Error::NonNumericAmount] naming the offending row, so corrupt data
//! can never silently misreport a balance as zero.

use std::{collections::BTreeMap, ops::RangeInclusive, str::FromStr};

use rust_decimal::Decimal;
use time::{Date, Duration, Month};

use crate::{Error, dashboard::transaction::LedgerRow, transaction::Kind};

/// Label used for rows that have no category in breakdowns.
pub(super) const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Swatch used for rows that have no category in breakdowns.
pub(super) const UNCATEGORIZED_COLOR: &str = "#9ca3af";

/// The headline numbers shown in the dashboard's stat cards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct DashboardStats {
    /// Sum of all income amounts.
    pub total_income: Decimal,
    /// Sum of all expense amounts.
    pub total_expenses: Decimal,
    /// `total_income - total_expenses`. May be negative.
    pub net_balance: Decimal,
    /// Income dated within the current calendar month.
    pub monthly_income: Decimal,
    /// Expenses dated within the current calendar month.
    pub monthly_expenses: Decimal,
}

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonthlyBucket {
    /// The month as `YYYY-MM`.
    pub month: String,
    /// Sum of income amounts dated in the month.
    pub income: Decimal,
    /// Sum of expense amounts dated in the month.
    pub expense: Decimal,
}

/// Income and expense totals for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DailyBucket {
    /// The day the totals are for.
    pub day: Date,
    /// Sum of income amounts dated on the day.
    pub income: Decimal,
    /// Sum of expense amounts dated on the day.
    pub expense: Decimal,
}

/// The total for one category within a filtered transaction set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryBreakdown {
    /// The category name, or [UNCATEGORIZED_LABEL] for rows without one.
    pub name: String,
    /// Sum of amounts for the category.
    pub value: Decimal,
    /// The category's color swatch.
    pub color: String,
}

/// The first and last calendar day of the month containing `today`.
pub(super) fn month_bounds(today: Date) -> RangeInclusive<Date> {
    let month_start = today.replace_day(1).unwrap();
    let month_end = today
        .replace_day(today.month().length(today.year()))
        .unwrap();

    month_start..=month_end
}

/// The Monday and Sunday of the week containing `today`.
///
/// Weeks start on Monday (ISO convention). The weekly chart labels days from
/// the same boundary, so the filter and the labels cannot drift apart.
pub(super) fn week_bounds(today: Date) -> RangeInclusive<Date> {
    let week_start = today - Duration::days(today.weekday().number_days_from_monday() as i64);

    week_start..=(week_start + Duration::days(6))
}

/// The date `months` calendar months before `today`, clamping the day to the
/// length of the target month (e.g. March 31 minus one month is February 28
/// or 29).
pub(super) fn months_before(today: Date, months: u32) -> Date {
    let mut year = today.year();
    let mut month = today.month();

    for _ in 0..months {
        month = month.previous();
        if month == Month::December {
            year -= 1;
        }
    }

    let day = today.day().min(month.length(year));

    Date::from_calendar_date(year, month, day).unwrap()
}

fn parse_amount(row: &LedgerRow) -> Result<Decimal, Error> {
    Decimal::from_str(row.amount.trim()).map_err(|_| Error::NonNumericAmount(row.id))
}

/// Compute the dashboard's headline totals from every transaction the user
/// owns.
///
/// An empty row set yields all-zero stats rather than an error. The result is
/// independent of the input order.
///
/// # Errors
/// Returns [Error::NonNumericAmount] if any row's stored amount cannot be
/// coerced to a decimal.
pub(super) fn compute_dashboard_stats(
    rows: &[LedgerRow],
    today: Date,
) -> Result<DashboardStats, Error> {
    let month_range = month_bounds(today);
    let mut stats = DashboardStats::default();

    for row in rows {
        let amount = parse_amount(row)?;
        let in_current_month = month_range.contains(&row.date);

        match row.kind {
            Kind::Income => {
                stats.total_income += amount;
                if in_current_month {
                    stats.monthly_income += amount;
                }
            }
            Kind::Expense => {
                stats.total_expenses += amount;
                if in_current_month {
                    stats.monthly_expenses += amount;
                }
            }
        }
    }

    stats.net_balance = stats.total_income - stats.total_expenses;

    Ok(stats)
}

/// Bucket rows by calendar month (`YYYY-MM`, not ISO week-year) and sum
/// income and expenses independently per bucket.
///
/// Only months with at least one transaction appear; gaps in history produce
/// gaps in the output. Buckets are keyed by calendar month, so the output is
/// ascending regardless of how the store ordered the rows.
///
/// # Errors
/// Returns [Error::NonNumericAmount] if any row's stored amount cannot be
/// coerced to a decimal.
pub(super) fn compute_monthly_summary(rows: &[LedgerRow]) -> Result<Vec<MonthlyBucket>, Error> {
    let mut buckets: BTreeMap<(i32, u8), (Decimal, Decimal)> = BTreeMap::new();

    for row in rows {
        let amount = parse_amount(row)?;
        let bucket = buckets
            .entry((row.date.year(), row.date.month() as u8))
            .or_default();

        match row.kind {
            Kind::Income => bucket.0 += amount,
            Kind::Expense => bucket.1 += amount,
        }
    }

    Ok(buckets
        .into_iter()
        .map(|((year, month), (income, expense))| MonthlyBucket {
            month: format!("{year:04}-{month:02}"),
            income,
            expense,
        })
        .collect())
}

/// Bucket rows by exact date and sum income and expenses independently per
/// day.
///
/// Only days with at least one transaction appear, in ascending date order.
/// The caller is expected to pass rows for the current week (see
/// [week_bounds]), but a wider or narrower set is still bucketed correctly.
///
/// # Errors
/// Returns [Error::NonNumericAmount] if any row's stored amount cannot be
/// coerced to a decimal.
pub(super) fn compute_weekly_summary(rows: &[LedgerRow]) -> Result<Vec<DailyBucket>, Error> {
    let mut buckets: BTreeMap<Date, (Decimal, Decimal)> = BTreeMap::new();

    for row in rows {
        let amount = parse_amount(row)?;
        let bucket = buckets.entry(row.date).or_default();

        match row.kind {
            Kind::Income => bucket.0 += amount,
            Kind::Expense => bucket.1 += amount,
        }
    }

    Ok(buckets
        .into_iter()
        .map(|(day, (income, expense))| DailyBucket {
            day,
            income,
            expense,
        })
        .collect())
}

/// Group rows of `kind` by category and sum their amounts, attaching each
/// category's name and color.
///
/// Categories with no matching transactions are omitted rather than emitted
/// with a zero value. Rows without a category are grouped under
/// [UNCATEGORIZED_LABEL]. The output is sorted descending by value so the
/// largest slice is listed first.
///
/// # Errors
/// Returns [Error::NonNumericAmount] if any row's stored amount cannot be
/// coerced to a decimal.
pub(super) fn compute_category_breakdown(
    rows: &[LedgerRow],
    kind: Kind,
) -> Result<Vec<CategoryBreakdown>, Error> {
    let mut totals: BTreeMap<String, (Decimal, String)> = BTreeMap::new();

    for row in rows.iter().filter(|row| row.kind == kind) {
        let amount = parse_amount(row)?;
        let name = row
            .category_name
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_owned());
        let color = row
            .category_color
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED_COLOR.to_owned());

        let entry = totals.entry(name).or_insert((Decimal::ZERO, color));
        entry.0 += amount;
    }

    let mut breakdown: Vec<CategoryBreakdown> = totals
        .into_iter()
        .map(|(name, (value, color))| CategoryBreakdown { name, value, color })
        .collect();

    breakdown.sort_by(|a, b| b.value.cmp(&a.value));

    Ok(breakdown)
}

#[cfg(test)]
mod date_math_tests {
    use time::macros::date;

    use super::{month_bounds, months_before, week_bounds};

    #[test]
    fn month_bounds_covers_whole_month() {
        let bounds = month_bounds(date!(2024 - 03 - 25));

        assert_eq!(*bounds.start(), date!(2024 - 03 - 01));
        assert_eq!(*bounds.end(), date!(2024 - 03 - 31));
    }

    #[test]
    fn month_bounds_handles_leap_february() {
        let bounds = month_bounds(date!(2024 - 02 - 10));

        assert_eq!(*bounds.end(), date!(2024 - 02 - 29));

        let bounds = month_bounds(date!(2023 - 02 - 10));

        assert_eq!(*bounds.end(), date!(2023 - 02 - 28));
    }

    #[test]
    fn week_bounds_starts_on_monday() {
        // 2024-03-25 is a Monday.
        let bounds = week_bounds(date!(2024 - 03 - 27));

        assert_eq!(*bounds.start(), date!(2024 - 03 - 25));
        assert_eq!(*bounds.end(), date!(2024 - 03 - 31));
    }

    #[test]
    fn week_bounds_contains_today_on_every_weekday() {
        for day in 25..=31 {
            let today = date!(2024 - 03 - 01).replace_day(day).unwrap();
            let bounds = week_bounds(today);

            assert!(bounds.contains(&today), "{today} not in its own week");
            assert_eq!(*bounds.start(), date!(2024 - 03 - 25));
        }
    }

    #[test]
    fn months_before_walks_across_year_boundary() {
        assert_eq!(months_before(date!(2024 - 03 - 25), 6), date!(2023 - 09 - 25));
    }

    #[test]
    fn months_before_clamps_day_to_month_length() {
        assert_eq!(months_before(date!(2024 - 03 - 31), 1), date!(2024 - 02 - 29));
        assert_eq!(months_before(date!(2023 - 03 - 31), 1), date!(2023 - 02 - 28));
        assert_eq!(months_before(date!(2024 - 07 - 31), 1), date!(2024 - 06 - 30));
    }

    #[test]
    fn months_before_zero_is_identity() {
        assert_eq!(months_before(date!(2024 - 03 - 25), 0), date!(2024 - 03 - 25));
    }
}
