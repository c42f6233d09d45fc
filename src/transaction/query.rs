//! Filtered transaction listing for the transactions page.

use std::str::FromStr;

use rusqlite::{Connection, Row, params_from_iter};
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error, UserID,
    category::{CategoryId, CategoryName, Color},
    transaction::{Kind, TransactionId},
};

/// The filter predicates the store supports for transaction listings: exact
/// kind match and an inclusive date range.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions of this kind.
    pub kind: Option<Kind>,
    /// Only include transactions dated on or after this date.
    pub date_from: Option<Date>,
    /// Only include transactions dated on or before this date.
    pub date_to: Option<Date>,
}

/// The order to sort transactions in a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    /// Oldest first.
    #[allow(dead_code)]
    Ascending,
    /// Newest first. The default for the transactions page.
    Descending,
}

/// A transaction row joined with its category for display in a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionListRow {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned.
    pub amount: Decimal,
    /// Whether the transaction is income or an expense.
    pub kind: Kind,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The ID of the transaction's category.
    pub category_id: Option<CategoryId>,
    /// The name of the transaction's category.
    pub category_name: Option<CategoryName>,
    /// The color swatch of the transaction's category.
    pub category_color: Option<Color>,
}

/// Get the transactions owned by `user_id` that match `filter`.
///
/// Rows are ordered by `date`, then `created_at`, then `id` in the requested
/// direction so that the ordering is stable across updates.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn list_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    sort_order: SortOrder,
    connection: &Connection,
) -> Result<Vec<TransactionListRow>, Error> {
    let mut query = "SELECT t.id, t.amount, t.kind, t.date, t.description,
            category.id, category.name, category.color
        FROM \"transaction\" t
        LEFT JOIN category ON category.id = t.category_id
        WHERE t.user_id = ?"
        .to_owned();
    let mut params = vec![user_id.as_i64().to_string()];

    if let Some(kind) = filter.kind {
        query.push_str(" AND t.kind = ?");
        params.push(kind.as_str().to_owned());
    }

    if let Some(date_from) = filter.date_from {
        query.push_str(" AND t.date >= ?");
        params.push(date_from.to_string());
    }

    if let Some(date_to) = filter.date_to {
        query.push_str(" AND t.date <= ?");
        params.push(date_to.to_string());
    }

    let order_clause = match sort_order {
        SortOrder::Ascending => " ORDER BY t.date ASC, t.created_at ASC, t.id ASC",
        SortOrder::Descending => " ORDER BY t.date DESC, t.created_at DESC, t.id DESC",
    };
    query.push_str(order_clause);

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_list_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Get the `count` most recent transactions owned by `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_recent_transactions(
    user_id: UserID,
    count: u32,
    connection: &Connection,
) -> Result<Vec<TransactionListRow>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.amount, t.kind, t.date, t.description,
                category.id, category.name, category.color
            FROM \"transaction\" t
            LEFT JOIN category ON category.id = t.category_id
            WHERE t.user_id = ?1
            ORDER BY t.date DESC, t.created_at DESC, t.id DESC
            LIMIT ?2",
        )?
        .query_map((user_id.as_i64(), count), map_list_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

fn map_list_row(row: &Row) -> Result<TransactionListRow, rusqlite::Error> {
    let raw_amount: String = row.get(1)?;
    let amount = Decimal::from_str(&raw_amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    })?;

    let category_name = row
        .get::<usize, Option<String>>(6)?
        .map(|name| CategoryName::new_unchecked(&name));
    let category_color = row
        .get::<usize, Option<String>>(7)?
        .map(|color| Color::new_unchecked(&color));

    Ok(TransactionListRow {
        id: row.get(0)?,
        amount,
        kind: row.get(2)?,
        date: row.get(3)?,
        description: row.get(4)?,
        category_id: row.get(5)?,
        category_name,
        category_color,
    })
}
