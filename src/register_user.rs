//! The registration page and endpoint for creating a new user account.

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
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link,
        log_in_register,
    },
    user::create_user,
};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct RegisterUserState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegisterUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegisterUserState> for Key {
    fn from_ref(state: &RegisterUserState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The email to register with.
    pub email: String,
    /// The password to register with.
    pub password: String,
    /// The password, again, to catch typos.
    pub confirm_password: String,
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = register_form_view("", "");
    let page = base(
        "Register",
        &[],
        &log_in_register("Create an account", &form),
    );

    page.into_response()
}

/// Handler for registration requests via the POST method.
///
/// On success the new user is logged in immediately and redirected to the
/// dashboard.
pub async fn register_user(
    State(state): State<RegisterUserState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let email = form.email.trim();
    if email.is_empty() || !email.contains('@') {
        return register_form_view(email, "Enter a valid email address.").into_response();
    }

    if form.password != form.confirm_password {
        return register_form_view(email, "The passwords do not match.").into_response();
    }

    let validated_password = match ValidatedPassword::new(&form.password) {
        Ok(validated_password) => validated_password,
        Err(Error::TooWeak(feedback)) => {
            return register_form_view(email, &format!("Password is too weak: {feedback}"))
                .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while validating password: {error}");
            return register_form_view(email, INTERNAL_ERROR_MSG).into_response();
        }
    };

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("Unhandled error while hashing password: {error}");
            return register_form_view(email, INTERNAL_ERROR_MSG).into_response();
        }
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return register_form_view(email, INTERNAL_ERROR_MSG).into_response();
            }
        };

        match create_user(email, password_hash, &connection) {
            Ok(user) => user,
            Err(Error::DuplicateEmail) => {
                return register_form_view(email, "That email is already registered.")
                    .into_response();
            }
            Err(error) => {
                tracing::error!("Unhandled error while creating user: {error}");
                return register_form_view(email, INTERNAL_ERROR_MSG).into_response();
            }
        }
    };

    set_auth_cookie(jar.clone(), user.id, state.cookie_duration)
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

fn register_form_view(email: &str, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
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
            }

            div
            {
                label for="confirm_password" class=(FORM_LABEL_STYLE) { "Confirm password" }

                input
                    id="confirm_password"
                    type="password"
                    name="confirm_password"
                    placeholder="••••••••"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                @if !error_message.is_empty() {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create account" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in"))
            }
        }
    }
}
