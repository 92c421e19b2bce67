//! HTTP surface: routes, session handling and page contexts.
//!
//! Pages answer with a JSON page context rather than rendered HTML; see
//! [`context::Page`].

pub mod accounts;
pub mod context;
pub mod error;
pub mod extract;
pub mod notes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::error::Result;
use crate::settings::{SessionSettings, Settings};
use crate::storage::SqliteStore;

pub const HOME_URL: &str = "/";
pub const LOGIN_URL: &str = "/auth/login/";
pub const SUCCESS_URL: &str = "/done/";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// One connection; each request's slug check and write run under this lock.
    pub store: Arc<Mutex<SqliteStore>>,
}

impl AppState {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

/// Build the application router with its session layer.
pub fn router(state: AppState, session: &SessionSettings) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(session.secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(
            session.inactivity_days,
        )));

    Router::new()
        .route("/", get(notes::home))
        .route("/notes/", get(notes::list))
        .route("/add/", get(notes::add_form).post(notes::add))
        .route("/done/", get(notes::success))
        .route("/note/{slug}/", get(notes::detail))
        .route("/edit/{slug}/", get(notes::edit_form).post(notes::edit))
        .route("/delete/{slug}/", get(notes::delete_form).post(notes::delete))
        .route("/auth/login/", get(accounts::login_form).post(accounts::login))
        .route("/auth/logout/", get(accounts::logout).post(accounts::logout))
        .route("/auth/signup/", get(accounts::signup_form).post(accounts::signup))
        .layer(session_layer)
        .with_state(state)
}

/// Open the store and serve until Ctrl-C.
pub async fn serve(settings: Settings) -> Result<()> {
    let store = SqliteStore::open(&settings.database.path)?;
    let app = router(AppState::new(store), &settings.session);

    let addr = settings.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, db = %settings.database.path.display(), "notekeeper listening");

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            trigger.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}
