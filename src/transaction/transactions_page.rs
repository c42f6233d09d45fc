//! The page listing a user's transactions with kind and date range filters.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use crate::{
    AppState, Error, UserID,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
    transaction::{
        Kind, SortOrder, TransactionFilter, TransactionListRow, form::parse_date,
        list_transactions,
    },
};

/// The state needed for displaying the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The filter query parameters accepted by the transactions page.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsPageQuery {
    /// Only show transactions of this kind ("income" or "expense").
    #[serde(default)]
    pub kind: Option<String>,
    /// Only show transactions dated on or after this date.
    #[serde(default)]
    pub from: Option<String>,
    /// Only show transactions dated on or before this date.
    #[serde(default)]
    pub to: Option<String>,
}

impl TransactionsPageQuery {
    /// Convert the raw query parameters into a [TransactionFilter].
    ///
    /// Unset and malformed parameters are dropped rather than failing the
    /// page, so a hand-edited URL still renders.
    fn to_filter(&self) -> TransactionFilter {
        let kind = self
            .kind
            .as_deref()
            .and_then(|raw_kind| raw_kind.parse::<Kind>().ok());
        let date_from = self
            .from
            .as_deref()
            .filter(|raw_date| !raw_date.is_empty())
            .and_then(|raw_date| parse_date(raw_date).ok());
        let date_to = self
            .to
            .as_deref()
            .filter(|raw_date| !raw_date.is_empty())
            .and_then(|raw_date| parse_date(raw_date).ok());

        TransactionFilter {
            kind,
            date_from,
            date_to,
        }
    }
}

/// Display a page with the user's transactions, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsPageQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let filter = query.to_filter();
    let transactions = list_transactions(user_id, &filter, SortOrder::Descending, &connection)
        .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?;

    Ok(transactions_view(&transactions, &query).into_response())
}

fn transactions_view(transactions: &[TransactionListRow], query: &TransactionsPageQuery) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-lg flex justify-between items-baseline mb-4"
            {
                h1 class="text-xl font-bold" { "Transactions" }

                a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                {
                    "New Transaction"
                }
            }

            (filter_form(query))

            @if transactions.is_empty() {
                p class="mt-6"
                {
                    "No transactions here yet. Add one "
                    (link(endpoints::NEW_TRANSACTION_VIEW, "here"))
                    "."
                }
            } @else {
                div class="w-full max-w-screen-lg relative overflow-x-auto shadow-md sm:rounded-lg"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction))
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

fn filter_form(query: &TransactionsPageQuery) -> Markup {
    let selected_kind = query.kind.as_deref().unwrap_or("");

    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="w-full max-w-screen-lg grid grid-cols-2 md:grid-cols-4 gap-3 items-end
                bg-gray-50 dark:bg-gray-800 p-4 rounded-lg"
        {
            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Type" }

                select id="kind" name="kind" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[selected_kind.is_empty()] { "All" }
                    option value="income" selected[selected_kind == "income"] { "Income" }
                    option value="expense" selected[selected_kind == "expense"] { "Expense" }
                }
            }

            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }

                input
                    id="from"
                    type="date"
                    name="from"
                    value=(query.from.as_deref().unwrap_or(""))
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }

                input
                    id="to"
                    type="date"
                    name="to"
                    value=(query.to.as_deref().unwrap_or(""))
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
        }
    }
}

fn transaction_row(transaction: &TransactionListRow) -> Markup {
    let amount = transaction.amount.to_f64().unwrap_or(0.0);
    let (amount_text, amount_style) = match transaction.kind {
        Kind::Income => (
            format!("+{}", format_currency(amount)),
            "text-green-600 dark:text-green-400 font-semibold",
        ),
        Kind::Expense => (
            format_currency(-amount),
            "text-red-600 dark:text-red-400 font-semibold",
        ),
    };

    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }

            td class=(TABLE_CELL_STYLE) { (transaction.description) }

            td class=(TABLE_CELL_STYLE)
            {
                @match (&transaction.category_name, &transaction.category_color) {
                    (Some(name), Some(color)) => {
                        span
                            class=(CATEGORY_BADGE_STYLE)
                            style=(format!("background-color: {color};"))
                        {
                            (name)
                        }
                    }
                    _ => { span class="text-gray-400" { "Uncategorized" } }
                }
            }

            td class=(format!("{TABLE_CELL_STYLE} {amount_style}")) { (amount_text) }

            td class=(TABLE_CELL_STYLE)
            {
                a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                " "

                button
                    type="button"
                    hx-delete=(delete_url)
                    hx-target="closest tr"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    hx-confirm="Delete this transaction?"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

#[cfg(test)]
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        PasswordHash, UserID,
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{Kind, Transaction, create_transaction},
        user::create_user,
    };

    use super::{TransactionsPageQuery, TransactionsPageState, get_transactions_page};

    fn get_test_state() -> (TransactionsPageState, UserID) {
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
            TransactionsPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn lists_transactions() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                user_id,
                Transaction::build("100".parse().unwrap(), Kind::Income, date!(2024 - 03 - 15))
                    .description("Salary"),
                &connection,
            )
            .unwrap();
            create_transaction(
                user_id,
                Transaction::build("40".parse().unwrap(), Kind::Expense, date!(2024 - 03 - 20))
                    .description("Groceries run"),
                &connection,
            )
            .unwrap();
        }

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(TransactionsPageQuery::default()),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&row_selector).count(), 2);

        let text = html.html();
        assert!(text.contains("Salary"));
        assert!(text.contains("Groceries run"));
        assert!(text.contains("+$100.00"));
        assert!(text.contains("-$40.00"));
    }

    #[tokio::test]
    async fn filters_by_kind_query_parameter() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                user_id,
                Transaction::build("100".parse().unwrap(), Kind::Income, date!(2024 - 03 - 15))
                    .description("Salary"),
                &connection,
            )
            .unwrap();
            create_transaction(
                user_id,
                Transaction::build("40".parse().unwrap(), Kind::Expense, date!(2024 - 03 - 20))
                    .description("Groceries run"),
                &connection,
            )
            .unwrap();
        }

        let query = TransactionsPageQuery {
            kind: Some("expense".to_owned()),
            ..Default::default()
        };
        let response = get_transactions_page(State(state), Extension(user_id), Query(query))
            .await
            .unwrap()
            .into_response();

        let html = parse_html_document(response).await;
        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&row_selector).count(), 1);
        assert!(html.html().contains("Groceries run"));
        assert!(!html.html().contains("Salary"));
    }

    #[test]
    fn query_deserialises_with_partial_parameters() {
        let query: TransactionsPageQuery =
            serde_html_form::from_str("kind=expense&from=2024-01-01").unwrap();

        assert_eq!(query.kind.as_deref(), Some("expense"));
        assert_eq!(query.from.as_deref(), Some("2024-01-01"));
        assert_eq!(query.to, None);

        let query: TransactionsPageQuery = serde_html_form::from_str("").unwrap();

        assert_eq!(query.kind, None);
    }

    #[tokio::test]
    async fn shows_empty_state_without_transactions() {
        let (state, user_id) = get_test_state();

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(TransactionsPageQuery::default()),
        )
        .await
        .unwrap()
        .into_response();

        let html = parse_html_document(response).await;
        assert!(html.html().contains("No transactions here yet"));
    }
}
