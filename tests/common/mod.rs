#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use notekeeper::entity::{Note, UserId};
use notekeeper::settings::SessionSettings;
use notekeeper::{auth, router, AppState, SqliteStore};
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// Slugs listed in the page's `object_list`.
    pub fn listed_slugs(&self) -> Vec<String> {
        self.json()["object_list"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["slug"].as_str().unwrap().to_string())
            .collect()
    }
}

/// A browser-like client: anonymous, or holding a session cookie.
#[derive(Clone)]
pub struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let header_str = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .map(|v| v.to_str().unwrap().to_string())
        };
        let location = header_str(header::LOCATION);
        let set_cookie = header_str(header::SET_COOKIE);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            location,
            set_cookie,
            body,
        }
    }

    fn builder(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = self.builder("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = self
            .builder("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

pub fn spawn_app() -> TestApp {
    let store = SqliteStore::open_in_memory().unwrap();
    let state = AppState::new(store);
    let app = router(state.clone(), &SessionSettings::default());
    TestApp { app, state }
}

impl TestApp {
    pub fn anonymous(&self) -> Client {
        Client {
            app: self.app.clone(),
            cookie: None,
        }
    }

    pub async fn create_user(&self, username: &str) -> UserId {
        let store = self.state.store.lock().await;
        auth::create_user(&store, username, PASSWORD).unwrap().id
    }

    /// Log in over HTTP and keep the session cookie.
    pub async fn login(&self, username: &str) -> Client {
        let response = self
            .anonymous()
            .post(
                "/auth/login/",
                &[("username", username), ("password", PASSWORD)],
            )
            .await;
        assert_eq!(response.status, StatusCode::FOUND, "login failed");
        let cookie = response
            .set_cookie
            .expect("login sets a session cookie")
            .split(';')
            .next()
            .unwrap()
            .to_string();
        Client {
            app: self.app.clone(),
            cookie: Some(cookie),
        }
    }

    pub async fn create_user_and_login(&self, username: &str) -> (UserId, Client) {
        let id = self.create_user(username).await;
        let client = self.login(username).await;
        (id, client)
    }

    pub async fn create_note(&self, author: UserId, title: &str, text: &str, slug: &str) -> Note {
        let note = Note::new(title.into(), text.into(), slug.into(), author);
        self.state.store.lock().await.insert_note(&note).unwrap();
        note
    }

    pub async fn note_count(&self) -> usize {
        self.state.store.lock().await.count_notes().unwrap()
    }

    pub async fn note(&self, slug: &str) -> Option<Note> {
        self.state.store.lock().await.get_note_by_slug(slug).unwrap()
    }

    pub async fn all_notes_of(&self, author: UserId) -> Vec<Note> {
        self.state
            .store
            .lock()
            .await
            .list_notes_by_author(author)
            .unwrap()
    }
}

pub fn login_redirect(next: &str) -> String {
    format!("/auth/login/?next={}", next)
}
