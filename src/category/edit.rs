//! Category edit page and endpoint.
//!
//! Only the name and color can be edited; the kind is fixed at creation so
//! that existing transactions never silently change sides of the ledger.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, UserID,
    category::{Category, CategoryId, CategoryName, Color, get_category, update_category},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for editing a category.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    /// The database connection for reading and updating categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Form data for editing a category. The kind is intentionally absent.
#[derive(Debug, Serialize, Deserialize)]
pub struct EditCategoryFormData {
    /// The new display name.
    pub name: String,
    /// The new `#rrggbb` color swatch.
    pub color: String,
}

/// Render the category edit page.
pub async fn get_edit_category_page(
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(user_id, category_id, &connection)?;

    Ok(edit_category_view(&category).into_response())
}

/// Handle category edit form submission.
pub async fn update_category_endpoint(
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    Form(form): Form<EditCategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let color = match Color::new(&form.color) {
        Ok(color) => color,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(user_id, category_id, name, color, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating a category: {error}");

            error.into_alert_response()
        }
    }
}

fn edit_category_view(category: &Category) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let update_endpoint = format_endpoint(endpoints::PUT_CATEGORY, category.id);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Category" }

            p class="text-sm text-gray-600 dark:text-gray-400 mb-4"
            {
                "This is a " (category.kind.label()) " category. The type cannot be changed \
                once transactions use it."
            }

            form
                hx-put=(update_endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label
                        for="name"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Category Name"
                    }

                    input
                        id="name"
                        type="text"
                        name="name"
                        value=(category.name)
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label
                        for="color"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Color"
                    }

                    input
                        id="color"
                        type="color"
                        name="color"
                        value=(category.color)
                        required
                        class="h-10 w-full cursor-pointer rounded border border-gray-300 dark:border-gray-600";
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Changes" }
            }
        }
    };

    base("Edit Category", &[], &content)
}

#[cfg(test)]
mod edit_category_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash, UserID,
        category::{CategoryName, Color, create_category, get_category},
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, must_get_form, parse_html_document,
        },
        transaction::Kind,
        user::create_user,
    };

    use super::{
        EditCategoryFormData, EditCategoryState, get_edit_category_page, update_category_endpoint,
    };

    fn get_test_state() -> (EditCategoryState, UserID) {
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
            EditCategoryState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn render_page_with_existing_values() {
        let (state, user_id) = get_test_state();
        let category = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                user_id,
                CategoryName::new_unchecked("Groceries"),
                Kind::Expense,
                Color::new_unchecked("#ef4444"),
                &connection,
            )
            .unwrap()
        };

        let response = get_edit_category_page(State(state), Extension(user_id), Path(category.id))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::PUT_CATEGORY, category.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Groceries");
        assert_form_input_with_value(&form, "color", "color", "#ef4444");
    }

    #[tokio::test]
    async fn render_page_returns_not_found_for_missing_category() {
        let (state, user_id) = get_test_state();

        let result = get_edit_category_page(State(state), Extension(user_id), Path(999)).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn can_update_category() {
        let (state, user_id) = get_test_state();
        let category = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                user_id,
                CategoryName::new_unchecked("Groceries"),
                Kind::Expense,
                Color::new_unchecked("#ef4444"),
                &connection,
            )
            .unwrap()
        };

        let form = EditCategoryFormData {
            name: "Food".to_owned(),
            color: "#f97316".to_owned(),
        };
        let response = update_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(category.id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let updated = get_category(user_id, category.id, &connection).unwrap();
        assert_eq!(updated.name, CategoryName::new_unchecked("Food"));
        assert_eq!(updated.color, Color::new_unchecked("#f97316"));
        assert_eq!(updated.kind, Kind::Expense);
    }

    #[tokio::test]
    async fn update_missing_category_returns_not_found() {
        let (state, user_id) = get_test_state();

        let form = EditCategoryFormData {
            name: "Food".to_owned(),
            color: "#f97316".to_owned(),
        };
        let response =
            update_category_endpoint(State(state), Extension(user_id), Path(999), Form(form))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
