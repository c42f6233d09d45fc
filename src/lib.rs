//! Coinflow is a web app for tracking personal income and expenses.
//!
//! Users record transactions, group them with categories, and get aggregated
//! summaries (totals, monthly and weekly buckets, category breakdowns) on a
//! dashboard. The library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod log_in;
mod log_out;
mod logging;
mod navigation;
mod not_found;
mod password;
mod register_user;
mod routing;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{User, UserID, count_users, get_user_by_id};

use crate::{
    alert::error_alert,
    category::CategoryId,
    internal_server_error::{InternalServerErrorPageTemplate, render_internal_server_error},
    not_found::get_404_not_found_response,
    transaction::TransactionId,
};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an email/password combination that does not match a
    /// registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The session token cookie is missing from the cookie jar in the request.
    ///
    /// The auth middleware turns this into a redirect to the log-in page, so
    /// a request without a session never reaches a store-backed handler.
    #[error("no session cookie in the cookie jar")]
    CookieMissing,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The email address given during registration is already registered.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// A string that is not a `#rrggbb` color was used for a category swatch.
    #[error("\"{0}\" is not a valid color")]
    InvalidColor(String),

    /// The category used to create or update a transaction does not refer to
    /// a category of the same kind owned by the same user.
    #[error("the category does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// The category still has transactions referencing it, so it cannot be
    /// deleted.
    #[error("the category is still used by at least one transaction")]
    CategoryInUse,

    /// A transaction amount from a form could not be read as a positive
    /// decimal number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// A date from a form could not be read as a `YYYY-MM-DD` calendar date.
    #[error("\"{0}\" is not a valid date")]
    InvalidDate(String),

    /// A stored transaction amount could not be coerced to a decimal number
    /// while aggregating, which means the row is corrupt. The aggregation
    /// that hit the row is aborted rather than silently misreporting totals.
    #[error("transaction {0} has a non-numeric amount")]
    NonNumericAmount(TransactionId),

    /// The requested resource was not found.
    ///
    /// Rows owned by other users are reported with this same error so that
    /// the existence of their records is not leaked.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical
    /// timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::CookieMissing | Error::InvalidCredentials => {
                Redirect::to(endpoints::LOG_IN_VIEW).into_response()
            }
            Error::InvalidTimezoneError(timezone) => {
                render_internal_server_error(InternalServerErrorPageTemplate {
                    description: "Invalid Timezone Settings",
                    fix: &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings \
                        and ensure the timezone has been set to a valid, canonical timezone string"
                    ),
                })
            }
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::CategoryInUse => (
                StatusCode::CONFLICT,
                error_alert(
                    "Could not delete category",
                    "The category still has transactions. Reassign or delete those \
                    transactions first.",
                ),
            )
                .into_response(),
            Error::InvalidCategory(_) => (
                StatusCode::BAD_REQUEST,
                error_alert(
                    "Invalid category",
                    "The selected category could not be found or does not match the \
                    transaction type.",
                ),
            )
                .into_response(),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                error_alert(
                    "Invalid amount",
                    &format!("\"{amount}\" is not a positive amount of money."),
                ),
            )
                .into_response(),
            Error::InvalidDate(date) => (
                StatusCode::BAD_REQUEST,
                error_alert(
                    "Invalid date",
                    &format!("\"{date}\" is not a YYYY-MM-DD calendar date."),
                ),
            )
                .into_response(),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                error_alert(
                    "Could not update transaction",
                    "The transaction could not be found.",
                ),
            )
                .into_response(),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                error_alert(
                    "Could not delete transaction",
                    "The transaction could not be found. \
                    Try refreshing the page to see if it has already been deleted.",
                ),
            )
                .into_response(),
            Error::UpdateMissingCategory => (
                StatusCode::NOT_FOUND,
                error_alert(
                    "Could not update category",
                    "The category could not be found.",
                ),
            )
                .into_response(),
            Error::DeleteMissingCategory => (
                StatusCode::NOT_FOUND,
                error_alert(
                    "Could not delete category",
                    "The category could not be found. \
                    Try refreshing the page to see if it has already been deleted.",
                ),
            )
                .into_response(),
            Error::NonNumericAmount(id) => {
                tracing::error!("transaction {id} has a non-numeric stored amount");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_alert(
                        "Corrupt transaction data",
                        &format!(
                            "Transaction {id} has an amount that is not a number, so the \
                            summaries could not be calculated."
                        ),
                    ),
                )
                    .into_response()
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_alert(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            )
                .into_response(),
        }
    }
}
