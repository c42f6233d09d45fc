//! The page for editing an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    category::{Category, get_categories},
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    transaction::{
        TransactionId, get_transaction,
        form::{
            TransactionFormValues, category_filter_script, transaction_form_fields,
            transaction_form_submit_button,
        },
    },
};

/// The state needed for displaying the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The database connection for reading the transaction and categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the form for editing a transaction.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(user_id, transaction_id, &connection)?;
    let categories = get_categories(user_id, None, &connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let values = TransactionFormValues {
        amount: transaction.amount.to_string(),
        kind: transaction.kind,
        date: transaction.date,
        description: transaction.description,
        category_id: transaction.category_id,
    };

    Ok(edit_transaction_view(transaction.id, &categories, &values).into_response())
}

fn edit_transaction_view(
    transaction_id: TransactionId,
    categories: &[Category],
    values: &TransactionFormValues,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let update_endpoint = format_endpoint(endpoints::PUT_TRANSACTION, transaction_id);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Transaction" }

            form
                hx-put=(update_endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (transaction_form_fields(categories, values))
                (transaction_form_submit_button("Save Changes"))
            }

            (category_filter_script())
        }
    };

    base("Edit Transaction", &[], &content)
}

#[cfg(test)]
mod edit_transaction_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, PasswordHash, UserID,
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document,
        },
        transaction::{Kind, Transaction, create_transaction},
        user::create_user,
    };

    use super::{EditTransactionPageState, get_edit_transaction_page};

    fn get_test_state() -> (EditTransactionPageState, UserID) {
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
            EditTransactionPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn render_page_with_existing_values() {
        let (state, user_id) = get_test_state();
        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                user_id,
                Transaction::build("12.30".parse().unwrap(), Kind::Expense, date!(2024 - 03 - 15))
                    .description("Coffee"),
                &connection,
            )
            .unwrap()
        };

        let response = get_edit_transaction_page(
            State(state),
            Extension(user_id),
            Path(transaction.id),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::PUT_TRANSACTION, transaction.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "amount", "number", "12.30");
        assert_form_input_with_value(&form, "date", "date", "2024-03-15");
    }

    #[tokio::test]
    async fn returns_not_found_for_missing_transaction() {
        let (state, user_id) = get_test_state();

        let result = get_edit_transaction_page(State(state), Extension(user_id), Path(999)).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn returns_not_found_for_other_users_transaction() {
        let (state, user_id) = get_test_state();
        let (transaction, other_user_id) = {
            let connection = state.db_connection.lock().unwrap();
            let other_user = create_user(
                "other@test.com",
                PasswordHash::new_unchecked("hunter3"),
                &connection,
            )
            .unwrap();
            let transaction = create_transaction(
                user_id,
                Transaction::build("12.30".parse().unwrap(), Kind::Expense, date!(2024 - 03 - 15)),
                &connection,
            )
            .unwrap();

            (transaction, other_user.id)
        };

        let result = get_edit_transaction_page(
            State(state),
            Extension(other_user_id),
            Path(transaction.id),
        )
        .await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
