//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, category::create_category_table, transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the application tables if they do not exist.
///
/// Tables are created inside a single exclusive transaction so that a
/// partially initialized database is never left behind. Foreign keys are
/// enabled on the connection since the schema relies on them for owner and
/// category references.
///
/// # Errors
/// Returns an error if any of the tables cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        for table in ["user", "category", "transaction"] {
            let count: u32 = connection
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();

            assert_eq!(count, 1, "table {table} should exist");
        }
    }

    #[test]
    fn is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");
        initialize(&connection).expect("Initializing twice should not fail");
    }
}
