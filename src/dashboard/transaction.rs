//! Database queries for retrieving dashboard transaction data.
//!
//! This module provides a simplified transaction view optimized for the
//! aggregation functions, containing only the fields needed for summarizing
//! (id, amount, kind, date, category name and color). Amounts are returned as
//! the raw text stored in the database so that coercion happens inside the
//! aggregation, where a bad row is reported per id instead of failing an
//! entire query opaquely.

use std::ops::RangeInclusive;

use rusqlite::Connection;
use time::Date;

use crate::{Error, UserID, transaction::{Kind, TransactionId}};

/// A simplified transaction view for dashboard aggregations.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct LedgerRow {
    /// The ID of the transaction, used to report rows with corrupt amounts.
    pub id: TransactionId,
    /// The stored amount, uncoerced.
    pub amount: String,
    /// Whether the transaction is income or an expense.
    pub kind: Kind,
    /// The date the transaction is attributed to.
    pub date: Date,
    /// The name of the transaction's category, if it has one.
    pub category_name: Option<String>,
    /// The color of the transaction's category, if it has one.
    pub category_color: Option<String>,
}

const LEDGER_ROW_SELECT: &str = "SELECT t.id, t.amount, t.kind, t.date, category.name, category.color
    FROM \"transaction\" t
    LEFT JOIN category ON category.id = t.category_id";

/// Get every ledger row owned by `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(super) fn get_ledger_rows(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<LedgerRow>, Error> {
    connection
        .prepare(&format!("{LEDGER_ROW_SELECT} WHERE t.user_id = ?1"))?
        .query_map([user_id.as_i64()], map_ledger_row)?
        .collect::<Result<Vec<LedgerRow>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Get the ledger rows owned by `user_id` dated on or after `from`, ascending
/// by date.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(super) fn get_ledger_rows_since(
    user_id: UserID,
    from: Date,
    connection: &Connection,
) -> Result<Vec<LedgerRow>, Error> {
    connection
        .prepare(&format!(
            "{LEDGER_ROW_SELECT} WHERE t.user_id = ?1 AND t.date >= ?2
            ORDER BY t.date ASC, t.created_at ASC, t.id ASC"
        ))?
        .query_map((user_id.as_i64(), from), map_ledger_row)?
        .collect::<Result<Vec<LedgerRow>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Get the ledger rows owned by `user_id` within the inclusive `date_range`,
/// ascending by date.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(super) fn get_ledger_rows_in_range(
    user_id: UserID,
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<LedgerRow>, Error> {
    connection
        .prepare(&format!(
            "{LEDGER_ROW_SELECT} WHERE t.user_id = ?1 AND t.date BETWEEN ?2 AND ?3
            ORDER BY t.date ASC, t.created_at ASC, t.id ASC"
        ))?
        .query_map(
            (user_id.as_i64(), *date_range.start(), *date_range.end()),
            map_ledger_row,
        )?
        .collect::<Result<Vec<LedgerRow>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

fn map_ledger_row(row: &rusqlite::Row) -> Result<LedgerRow, rusqlite::Error> {
    Ok(LedgerRow {
        id: row.get(0)?,
        amount: row.get(1)?,
        kind: row.get(2)?,
        date: row.get(3)?,
        category_name: row.get(4)?,
        category_color: row.get(5)?,
    })
}
