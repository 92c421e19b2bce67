//! Signup, login and logout pages. All of them are open to anonymous callers.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use tower_sessions::Session;

use super::context::{FormContext, NoContext, Page, UsernameData};
use super::extract::{found, safe_next, Viewer};
use super::{AppState, HOME_URL, LOGIN_URL};
use crate::auth::{self, SESSION_USER_ID_KEY};
use crate::entity::User;
use crate::error::{NotekeeperError, Result};
use crate::forms::{LoginForm, SignupForm};

const LOGIN_FORM: &str = "LoginForm";
const SIGNUP_FORM: &str = "SignupForm";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

fn session_error(e: tower_sessions::session::Error) -> NotekeeperError {
    NotekeeperError::Session(e.to_string())
}

/// Run argon2 work on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| NotekeeperError::Task(e.to_string()))?
}

/// The store lock covers the lookup only, never the hash check.
async fn check_login(state: &AppState, form: &LoginForm) -> Result<User> {
    form.validate().map_err(NotekeeperError::Validation)?;
    let user = {
        let store = state.store.lock().await;
        store.get_user_by_username(form.username.trim())?
    };
    let password = form.password.clone();
    blocking(move || auth::verify_login(user, &password)).await
}

async fn register(state: &AppState, form: &SignupForm) -> Result<User> {
    form.validate().map_err(NotekeeperError::Validation)?;
    let username = form.username.trim().to_string();
    let password = form.password1.clone();
    let user = blocking(move || auth::new_user(&username, &password)).await?;

    let store = state.store.lock().await;
    auth::save_signup(&store, user)
}

pub async fn login_form(viewer: Viewer) -> Page<FormContext<UsernameData>> {
    Page::new(
        "users:login",
        viewer.username,
        FormContext::blank(LOGIN_FORM, UsernameData::default()),
    )
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let user = match check_login(&state, &form).await {
        Ok(user) => user,
        Err(NotekeeperError::Validation(errors)) => {
            let data = UsernameData {
                username: form.username,
            };
            return Ok(Page::new("users:login", None, FormContext::new(LOGIN_FORM, data, errors))
                .into_response());
        }
        Err(e) => return Err(e),
    };

    session.cycle_id().await.map_err(session_error)?;
    session
        .insert(SESSION_USER_ID_KEY, user.id.to_string())
        .await
        .map_err(session_error)?;

    tracing::info!(username = %user.username, "user logged in");
    let target = safe_next(query.next.as_deref()).unwrap_or(HOME_URL);
    Ok(found(target))
}

/// GET and POST both end the session.
pub async fn logout(session: Session) -> Result<Page<NoContext>> {
    session.flush().await.map_err(session_error)?;
    tracing::info!("user logged out");
    Ok(Page::new("users:logout", None, NoContext {}))
}

pub async fn signup_form(viewer: Viewer) -> Page<FormContext<UsernameData>> {
    Page::new(
        "users:signup",
        viewer.username,
        FormContext::blank(SIGNUP_FORM, UsernameData::default()),
    )
}

pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Result<Response> {
    match register(&state, &form).await {
        Ok(_) => Ok(found(LOGIN_URL)),
        Err(NotekeeperError::Validation(errors)) => {
            let data = UsernameData {
                username: form.username,
            };
            Ok(Page::new("users:signup", None, FormContext::new(SIGNUP_FORM, data, errors))
                .into_response())
        }
        Err(e) => Err(e),
    }
}
