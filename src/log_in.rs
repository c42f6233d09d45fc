//! This file defines the routes for displaying the log-in page and handling
//! log-in requests. The auth module handles the lower level cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, User,
    app_state::create_cookie_key,
    auth::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link,
        log_in_register,
    },
    user::get_user_by_email,
};

/// How long the auth cookie should last if the user selects "remember me" at
/// log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The error shown when the email or password does not match a registered
/// user. Deliberately identical for both cases.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl LoginState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection,
        }
    }
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
///
/// The email and password are stored as plain strings. There is no need for
/// validation here since they will be compared against the email and password
/// in the database, which have been verified.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,
    /// Password entered during log-in.
    pub password: String,
    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is
    /// not set. The `Some` variant should be interpreted as `true` regardless
    /// of the string value, and the `None` variant as `false`.
    pub remember_me: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page() -> Response {
    let form = log_in_form_view("", "");
    let page = base("Log In", &[], &log_in_register("Log in to your account", &form));

    page.into_response()
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the client is
/// redirected to the dashboard page. Otherwise, the form is returned with an
/// error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return log_in_error_response(&user_data.email, INTERNAL_ERROR_MSG);
        }
    };

    let user: User = match get_user_by_email(&user_data.email, &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            return log_in_error_response(&user_data.email, INVALID_CREDENTIALS_ERROR_MSG);
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_error_response(&user_data.email, INTERNAL_ERROR_MSG);
        }
    };

    let is_password_valid = match user.password_hash.verify(&user_data.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_error_response(&user_data.email, INTERNAL_ERROR_MSG);
        }
    };

    if !is_password_valid {
        return log_in_error_response(&user_data.email, INVALID_CREDENTIALS_ERROR_MSG);
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    set_auth_cookie(jar.clone(), user.id, cookie_duration)
        .map(|updated_jar| {
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                updated_jar,
            )
        })
        .map_err(|err| {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
        })
        .into_response()
}

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

fn log_in_error_response(email: &str, error_message: &str) -> Response {
    log_in_form_view(email, error_message).into_response()
}

fn log_in_form_view(email: &str, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Your email" }

                input
                    id="email"
                    type="email"
                    name="email"
                    placeholder="name@example.com"
                    value=(email)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="password" class=(FORM_LABEL_STYLE) { "Password" }

                input
                    id="password"
                    type="password"
                    name="password"
                    placeholder="••••••••"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                @if !error_message.is_empty() {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            div class="flex items-center"
            {
                input
                    id="remember_me"
                    type="checkbox"
                    name="remember_me"
                    class="w-4 h-4 rounded-sm border-gray-300";

                label for="remember_me" class="ms-2 text-sm text-gray-900 dark:text-white"
                {
                    "Remember me"
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log In" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account yet? "
                (link(endpoints::REGISTER_VIEW, "Register"))
            }
        }
    }
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::http::{StatusCode, header::CONTENT_TYPE};

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::get_log_in_page;

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let response = get_log_in_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::LOG_IN_API, "hx-post");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        assert_form_submit_button(&form);
    }
}
