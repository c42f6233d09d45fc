//! Defines the core data models and database queries for transactions.

use std::str::FromStr;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, UserID, category::CategoryId, category::get_category};

/// Whether a transaction (or category) records money earned or money spent.
///
/// The stored amount is always positive; the kind carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl Kind {
    /// The kind as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "income",
            Kind::Expense => "expense",
        }
    }

    /// The kind as a capitalized label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Income => "Income",
            Kind::Expense => "Expense",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Kind::Income),
            "expense" => Ok(Kind::Expense),
            _ => Err(()),
        }
    }
}

impl ToSql for Kind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Kind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|s| Kind::from_str(s).map_err(|_| FromSqlError::InvalidType))
    }
}

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns this transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned. Always positive; the sign is
    /// carried by `kind`.
    pub amount: Decimal,
    /// Whether the transaction is income or an expense.
    pub kind: Kind,
    /// The calendar date the transaction is attributed to. Distinct from
    /// `created_at` and the only field used for bucketing.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// When the row was inserted. Used only as an ordering tie-break.
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: Decimal, kind: Kind, date: Date) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            kind,
            date,
            description: String::new(),
            category_id: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The monetary amount of the transaction. Must be positive.
    pub amount: Decimal,
    /// Whether the transaction is income or an expense.
    pub kind: Kind,
    /// The date when the transaction occurred.
    pub date: Date,
    /// A human-readable description of the transaction.
    pub description: String,
    /// The category of the transaction.
    pub category_id: Option<CategoryId>,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the category for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}

/// Create a new transaction owned by `user_id` from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not positive,
/// - [Error::InvalidCategory] if the category does not refer to a category of
///   the same kind owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(builder.amount)?;
    validate_category(user_id, builder.category_id, builder.kind, connection)?;

    let created_at = OffsetDateTime::now_utc();

    let id = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, amount, kind, date, description, category_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id",
        )?
        .query_row(
            (
                user_id.as_i64(),
                builder.amount.to_string(),
                builder.kind,
                builder.date,
                &builder.description,
                builder.category_id,
                created_at,
            ),
            |row| row.get(0),
        )?;

    Ok(Transaction {
        id,
        user_id,
        amount: builder.amount,
        kind: builder.kind,
        date: builder.date,
        description: builder.description,
        category_id: builder.category_id,
        created_at,
    })
}

/// Retrieve a transaction owned by `user_id` by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by
///   `user_id` (rows owned by other users report the same error),
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, amount, kind, date, description, category_id, created_at
            FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Update every field of a transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not positive,
/// - [Error::InvalidCategory] if the category does not refer to a category of
///   the same kind owned by `user_id`,
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a
///   transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    validate_amount(builder.amount)?;
    validate_category(user_id, builder.category_id, builder.kind, connection)?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
        SET amount = ?1, kind = ?2, date = ?3, description = ?4, category_id = ?5
        WHERE id = ?6 AND user_id = ?7",
        (
            builder.amount.to_string(),
            builder.kind,
            builder.date,
            &builder.description,
            builder.category_id,
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete a transaction owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::DeleteMissingTransaction] if `id` does
/// not refer to a transaction owned by `user_id`.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the number of transactions owned by `user_id`.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1;",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            category_id INTEGER,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id)
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date
            ON \"transaction\"(user_id, date, kind);",
    )?;

    Ok(())
}

fn validate_amount(amount: Decimal) -> Result<(), Error> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount(amount.to_string()));
    }

    Ok(())
}

/// Check that the referenced category exists, is owned by `user_id`, and has
/// the same kind as the transaction.
///
/// A category owned by another user is reported the same as a missing one so
/// that the existence of other users' rows is not leaked.
fn validate_category(
    user_id: UserID,
    category_id: Option<CategoryId>,
    kind: Kind,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    let category = get_category(user_id, category_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCategory(Some(category_id)),
        error => error,
    })?;

    if category.kind != kind {
        return Err(Error::InvalidCategory(Some(category_id)));
    }

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Amounts are stored as TEXT; a row whose amount does not parse as a decimal
/// is reported as a column conversion failure rather than silently coerced.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_amount: String = row.get(2)?;
    let amount = Decimal::from_str(&raw_amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount,
        kind: row.get(3)?,
        date: row.get(4)?,
        description: row.get(5)?,
        category_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        Error, PasswordHash, UserID,
        category::{CategoryName, Color, create_category},
        db::initialize,
        transaction::{
            Kind, Transaction, count_transactions, create_transaction, delete_transaction,
            get_transaction, update_transaction,
        },
        user::create_user,
    };

    fn get_test_connection() -> (Connection, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = create_user(
            "test@test.com",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .expect("Could not create test user");

        (conn, user.id)
    }

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn create_succeeds() {
        let (conn, user_id) = get_test_connection();
        let amount = decimal("12.30");

        let result = create_transaction(
            user_id,
            Transaction::build(amount, Kind::Expense, date!(2025 - 10 - 05))
                .description("Coffee shop purchase"),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.kind, Kind::Expense);
                assert_eq!(transaction.user_id, user_id);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        let (conn, user_id) = get_test_connection();

        for raw_amount in ["0", "-12.30"] {
            let amount = decimal(raw_amount);
            let result = create_transaction(
                user_id,
                Transaction::build(amount, Kind::Expense, date!(2025 - 10 - 05)),
                &conn,
            );

            assert_eq!(result, Err(Error::InvalidAmount(amount.to_string())));
        }
    }

    #[test]
    fn create_fails_on_invalid_category_id() {
        let (conn, user_id) = get_test_connection();
        let category_id = Some(42);

        let result = create_transaction(
            user_id,
            Transaction::build(decimal("123.45"), Kind::Expense, date!(2025 - 10 - 04))
                .category_id(category_id),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(category_id)));
    }

    #[test]
    fn create_fails_on_category_kind_mismatch() {
        let (conn, user_id) = get_test_connection();
        let category = create_category(
            user_id,
            CategoryName::new_unchecked("Salary"),
            Kind::Income,
            Color::new_unchecked("#22c55e"),
            &conn,
        )
        .unwrap();

        let result = create_transaction(
            user_id,
            Transaction::build(decimal("123.45"), Kind::Expense, date!(2025 - 10 - 04))
                .category_id(Some(category.id)),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(Some(category.id))));
    }

    #[test]
    fn create_fails_on_other_users_category() {
        let (conn, user_id) = get_test_connection();
        let other_user = create_user(
            "other@test.com",
            PasswordHash::new_unchecked("hunter3"),
            &conn,
        )
        .unwrap();
        let someone_elses_category = create_category(
            other_user.id,
            CategoryName::new_unchecked("Groceries"),
            Kind::Expense,
            Color::new_unchecked("#22c55e"),
            &conn,
        )
        .unwrap();

        let result = create_transaction(
            user_id,
            Transaction::build(decimal("10"), Kind::Expense, date!(2025 - 10 - 04))
                .category_id(Some(someone_elses_category.id)),
            &conn,
        );

        // The error must not reveal that the category exists for someone else.
        assert_eq!(
            result,
            Err(Error::InvalidCategory(Some(someone_elses_category.id)))
        );
    }

    #[test]
    fn get_transaction_succeeds() {
        let (conn, user_id) = get_test_connection();
        let inserted = create_transaction(
            user_id,
            Transaction::build(decimal("3.14"), Kind::Expense, date!(2024 - 08 - 07))
                .description("Rust Pie"),
            &conn,
        )
        .unwrap();

        let selected = get_transaction(user_id, inserted.id, &conn).unwrap();

        assert_eq!(inserted, selected);
    }

    #[test]
    fn get_transaction_fails_on_invalid_id() {
        let (conn, user_id) = get_test_connection();
        let inserted = create_transaction(
            user_id,
            Transaction::build(decimal("3.14"), Kind::Expense, date!(2024 - 08 - 07)),
            &conn,
        )
        .unwrap();

        let result = get_transaction(user_id, inserted.id + 1, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_transaction_owned_by_another_user_returns_not_found() {
        let (conn, user_id) = get_test_connection();
        let other_user = create_user(
            "other@test.com",
            PasswordHash::new_unchecked("hunter3"),
            &conn,
        )
        .unwrap();
        let inserted = create_transaction(
            user_id,
            Transaction::build(decimal("3.14"), Kind::Expense, date!(2024 - 08 - 07)),
            &conn,
        )
        .unwrap();

        let result = get_transaction(other_user.id, inserted.id, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_transaction_succeeds() {
        let (conn, user_id) = get_test_connection();
        let inserted = create_transaction(
            user_id,
            Transaction::build(decimal("3.14"), Kind::Expense, date!(2024 - 08 - 07)),
            &conn,
        )
        .unwrap();

        let result = update_transaction(
            user_id,
            inserted.id,
            Transaction::build(decimal("45.99"), Kind::Income, date!(2024 - 08 - 08))
                .description("Refund"),
            &conn,
        );

        assert_eq!(result, Ok(()));

        let updated = get_transaction(user_id, inserted.id, &conn).unwrap();
        assert_eq!(updated.amount, decimal("45.99"));
        assert_eq!(updated.kind, Kind::Income);
        assert_eq!(updated.date, date!(2024 - 08 - 08));
        assert_eq!(updated.description, "Refund");
    }

    #[test]
    fn update_transaction_owned_by_another_user_returns_not_found() {
        let (conn, user_id) = get_test_connection();
        let other_user = create_user(
            "other@test.com",
            PasswordHash::new_unchecked("hunter3"),
            &conn,
        )
        .unwrap();
        let inserted = create_transaction(
            user_id,
            Transaction::build(decimal("3.14"), Kind::Expense, date!(2024 - 08 - 07)),
            &conn,
        )
        .unwrap();

        let result = update_transaction(
            other_user.id,
            inserted.id,
            Transaction::build(decimal("1"), Kind::Expense, date!(2024 - 08 - 07)),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
        // The row must be unchanged.
        let unchanged = get_transaction(user_id, inserted.id, &conn).unwrap();
        assert_eq!(unchanged, inserted);
    }

    #[test]
    fn delete_transaction_succeeds() {
        let (conn, user_id) = get_test_connection();
        let inserted = create_transaction(
            user_id,
            Transaction::build(decimal("3.14"), Kind::Expense, date!(2024 - 08 - 07)),
            &conn,
        )
        .unwrap();

        let result = delete_transaction(user_id, inserted.id, &conn);

        assert_eq!(result, Ok(()));
        assert_eq!(
            get_transaction(user_id, inserted.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_transaction_owned_by_another_user_returns_not_found() {
        let (conn, user_id) = get_test_connection();
        let other_user = create_user(
            "other@test.com",
            PasswordHash::new_unchecked("hunter3"),
            &conn,
        )
        .unwrap();
        let inserted = create_transaction(
            user_id,
            Transaction::build(decimal("3.14"), Kind::Expense, date!(2024 - 08 - 07)),
            &conn,
        )
        .unwrap();

        let result = delete_transaction(other_user.id, inserted.id, &conn);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert!(get_transaction(user_id, inserted.id, &conn).is_ok());
    }

    #[test]
    fn get_count() {
        let (conn, user_id) = get_test_connection();
        let today = date!(2025 - 10 - 05);
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                user_id,
                Transaction::build(Decimal::from(i), Kind::Income, today),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(user_id, &conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }

    #[test]
    fn amounts_round_trip_exactly() {
        let (conn, user_id) = get_test_connection();
        // 0.1 + 0.2 style values that are not exactly representable as floats.
        let amount = decimal("0.30");
        let inserted = create_transaction(
            user_id,
            Transaction::build(amount, Kind::Expense, date!(2025 - 10 - 05)),
            &conn,
        )
        .unwrap();

        let selected = get_transaction(user_id, inserted.id, &conn).unwrap();

        assert_eq!(selected.amount, amount);
        assert_eq!(selected.amount.to_string(), "0.30");
    }
}
