//! The page listing a user's categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    category::{Category, get_categories},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, link,
    },
    navigation::NavBar,
};

/// The state needed for displaying the categories page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    /// The database connection for reading categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display a page listing the user's categories.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, None, &connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    Ok(categories_view(&categories).into_response())
}

fn categories_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-md flex justify-between items-baseline mb-4"
            {
                h1 class="text-xl font-bold" { "Categories" }

                a href=(endpoints::NEW_CATEGORY_VIEW) class=(LINK_STYLE)
                {
                    "New Category"
                }
            }

            @if categories.is_empty() {
                p
                {
                    "No categories yet. Create one "
                    (link(endpoints::NEW_CATEGORY_VIEW, "here"))
                    " to start grouping your transactions."
                }
            } @else {
                div class="w-full max-w-screen-md relative overflow-x-auto shadow-md sm:rounded-lg"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for category in categories {
                                (category_row(category))
                            }
                        }
                    }
                }
            }
        }
    };

    base("Categories", &[], &content)
}

fn category_row(category: &Category) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id);
    let delete_url = format_endpoint(endpoints::DELETE_CATEGORY, category.id);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                span
                    class=(CATEGORY_BADGE_STYLE)
                    style=(format!("background-color: {};", category.color))
                {
                    (category.name)
                }
            }

            td class=(TABLE_CELL_STYLE) { (category.kind.label()) }

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
                    hx-confirm="Delete this category?"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

#[cfg(test)]
mod categories_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        PasswordHash, UserID,
        category::{CategoryName, Color, create_category},
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::Kind,
        user::create_user,
    };

    use super::{CategoriesPageState, get_categories_page};

    fn get_test_state() -> (CategoriesPageState, UserID) {
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
            CategoriesPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn lists_categories_with_swatches() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                user_id,
                CategoryName::new_unchecked("Groceries"),
                Kind::Expense,
                Color::new_unchecked("#ef4444"),
                &connection,
            )
            .unwrap();
            create_category(
                user_id,
                CategoryName::new_unchecked("Salary"),
                Kind::Income,
                Color::new_unchecked("#22c55e"),
                &connection,
            )
            .unwrap();
        }

        let response = get_categories_page(State(state), Extension(user_id))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&row_selector).count(), 2);

        let text = html.html();
        assert!(text.contains("Groceries"));
        assert!(text.contains("Salary"));
        assert!(text.contains("background-color: #ef4444;"));
    }

    #[tokio::test]
    async fn shows_empty_state_without_categories() {
        let (state, user_id) = get_test_state();

        let response = get_categories_page(State(state), Extension(user_id))
            .await
            .unwrap()
            .into_response();

        let html = parse_html_document(response).await;
        assert!(html.html().contains("No categories yet."));
    }
}
