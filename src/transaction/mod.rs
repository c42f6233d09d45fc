//! Transaction management for the application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - View handlers for transaction-related web pages

mod core;
mod create_transaction_endpoint;
mod delete_transaction_endpoint;
mod edit_page;
mod edit_transaction_endpoint;
mod form;
mod new_transaction_page;
mod query;
mod transactions_page;

pub use core::{
    Kind, Transaction, TransactionBuilder, TransactionId, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, map_transaction_row,
    update_transaction,
};
pub use create_transaction_endpoint::create_transaction_endpoint;
pub use delete_transaction_endpoint::delete_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use edit_transaction_endpoint::edit_transaction_endpoint;
pub use new_transaction_page::get_new_transaction_page;
pub use query::{
    SortOrder, TransactionFilter, TransactionListRow, get_recent_transactions, list_transactions,
};
pub use transactions_page::get_transactions_page;

#[cfg(test)]
pub use core::count_transactions;
