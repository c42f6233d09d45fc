//! The page for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error, UserID,
    category::{Category, get_categories},
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, link},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{
        Kind,
        form::{
            TransactionFormValues, category_filter_script, transaction_form_fields,
            transaction_form_submit_button,
        },
    },
};

/// The state needed for displaying the new transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    /// The database connection for reading the user's categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display the form for recording a new transaction.
pub async fn get_new_transaction_page(
    State(state): State<NewTransactionPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, None, &connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let local_timezone = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let values = TransactionFormValues {
        amount: String::new(),
        kind: Kind::Expense,
        date: today,
        description: String::new(),
        category_id: None,
    };

    Ok(new_transaction_view(&categories, &values).into_response())
}

fn new_transaction_view(categories: &[Category], values: &TransactionFormValues) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let new_category_link = link(endpoints::NEW_CATEGORY_VIEW, "create one first");

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Transaction" }

            @if categories.is_empty() {
                p class="mb-4"
                {
                    "You have no categories yet, you may want to " (new_category_link) "."
                }
            }

            form
                hx-post=(endpoints::POST_TRANSACTION)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (transaction_form_fields(categories, values))
                (transaction_form_submit_button("Add Transaction"))
            }

            (category_filter_script())
        }
    };

    base("New Transaction", &[], &content)
}
