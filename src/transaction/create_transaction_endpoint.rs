//! The endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID, endpoints,
    transaction::{create_transaction, form::{TransactionFormData, parse_transaction_form}},
};

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionEndpointState {
    /// The database connection for storing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle transaction creation form submission.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let builder = match parse_transaction_form(&form) {
        Ok(builder) => builder,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_transaction(user_id, builder, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");

            error.into_alert_response()
        }
    }
}
