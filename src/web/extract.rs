//! Request extractors that resolve the session into an [`Identity`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tower_sessions::Session;

use super::{AppState, LOGIN_URL};
use crate::access::Identity;
use crate::auth::SESSION_USER_ID_KEY;
use crate::entity::UserId;
use crate::error::NotekeeperError;

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Login URL carrying `next` as the return destination. Slashes stay literal.
pub fn login_url_with_next(next: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{}?next={}", LOGIN_URL, encoded.replace("%2F", "/"))
}

/// Only local absolute paths are honoured as a post-login destination.
/// Browsers strip tab, CR and LF from URLs, so `/\t/host` would still leave
/// the site; any control character disqualifies `next`.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        n.starts_with('/')
            && !n.starts_with("//")
            && !n.contains('\\')
            && !n.chars().any(|c| c.is_ascii_control())
    })
}

fn requested_path(uri: &Uri) -> &str {
    uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/")
}

pub(crate) async fn session_from_parts(
    parts: &mut Parts,
    state: &AppState,
) -> Result<Session, NotekeeperError> {
    Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| NotekeeperError::Session(msg.to_string()))
}

/// Whoever is making the request, possibly anonymous.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub identity: Identity,
    pub username: Option<String>,
}

impl Viewer {
    fn anonymous() -> Self {
        Self {
            identity: Identity::Anonymous,
            username: None,
        }
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = NotekeeperError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts, state).await?;
        let user_id: Option<String> = session
            .get(SESSION_USER_ID_KEY)
            .await
            .map_err(|e| NotekeeperError::Session(e.to_string()))?;

        let Some(id) = user_id.and_then(|s| s.parse::<UserId>().ok()) else {
            return Ok(Viewer::anonymous());
        };

        let store = state.store.lock().await;
        match store.get_user(id)? {
            Some(user) => Ok(Viewer {
                identity: Identity::User(user.id),
                username: Some(user.username),
            }),
            // Session outlived its account.
            None => Ok(Viewer::anonymous()),
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub id: UserId,
    pub username: String,
}

impl SignedIn {
    pub fn identity(&self) -> Identity {
        Identity::User(self.id)
    }

    pub fn name(&self) -> Option<String> {
        Some(self.username.clone())
    }
}

/// Gate for protected pages. Anonymous callers are sent to the login page
/// with the requested URL as `next`.
#[derive(Debug, Clone)]
pub struct LoginRequired(pub SignedIn);

impl FromRequestParts<AppState> for LoginRequired {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let viewer = Viewer::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match (viewer.identity, viewer.username) {
            (Identity::User(id), Some(username)) => Ok(LoginRequired(SignedIn { id, username })),
            _ => Err(found(&login_url_with_next(requested_path(&parts.uri)))),
        }
    }
}
