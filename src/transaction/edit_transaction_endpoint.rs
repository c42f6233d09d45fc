//! The endpoint for updating an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID, endpoints,
    transaction::{
        TransactionId, form::{TransactionFormData, parse_transaction_form}, update_transaction,
    },
};

/// The state needed for updating a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionEndpointState {
    /// The database connection for updating transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle transaction edit form submission.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionEndpointState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
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

    match update_transaction(user_id, transaction_id, builder, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating a transaction: {error}");

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod edit_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        PasswordHash, UserID, endpoints,
        db::initialize,
        test_utils::assert_hx_redirect,
        transaction::{
            Kind, Transaction, create_transaction, form::TransactionFormData, get_transaction,
        },
        user::create_user,
    };

    use super::{EditTransactionEndpointState, edit_transaction_endpoint};

    fn get_test_state() -> (EditTransactionEndpointState, UserID) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let user = create_user(
            "test@test.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user");

        (
            EditTransactionEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn can_update_transaction() {
        let (state, user_id) = get_test_state();
        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                user_id,
                Transaction::build("12.30".parse().unwrap(), Kind::Expense, date!(2024 - 03 - 15)),
                &connection,
            )
            .unwrap()
        };

        let form = TransactionFormData {
            amount: "45.99".to_owned(),
            kind: Kind::Income,
            date: "2024-03-16".to_owned(),
            description: "Refund".to_owned(),
            category_id: None,
        };
        let response = edit_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(transaction.id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let updated = get_transaction(user_id, transaction.id, &connection).unwrap();
        assert_eq!(updated.amount, "45.99".parse().unwrap());
        assert_eq!(updated.kind, Kind::Income);
        assert_eq!(updated.date, date!(2024 - 03 - 16));
        assert_eq!(updated.description, "Refund");
    }

    #[tokio::test]
    async fn update_missing_transaction_returns_not_found() {
        let (state, user_id) = get_test_state();

        let form = TransactionFormData {
            amount: "45.99".to_owned(),
            kind: Kind::Income,
            date: "2024-03-16".to_owned(),
            description: String::new(),
            category_id: None,
        };
        let response = edit_transaction_endpoint(
            State(state),
            Extension(user_id),
            Path(999),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
