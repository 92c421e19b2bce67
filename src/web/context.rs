//! Page contexts returned by every view, serialized as JSON.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::entity::{Note, NoteView};
use crate::forms::FormErrors;

/// `{ "page": <route name>, "user": <username|null>, ...context }`
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub page: &'static str,
    pub user: Option<String>,
    #[serde(flatten)]
    pub context: T,
}

impl<T: Serialize> Page<T> {
    pub fn new(page: &'static str, user: Option<String>, context: T) -> Self {
        Self {
            page,
            user,
            context,
        }
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Default, Serialize)]
pub struct NoContext {}

#[derive(Debug, Serialize)]
pub struct ListContext {
    pub object_list: Vec<NoteView>,
}

impl ListContext {
    pub fn new(notes: &[Note]) -> Self {
        Self {
            object_list: notes.iter().map(Note::to_view).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteContext {
    pub note: NoteView,
}

/// A form as shown to the user: its kind, the values to prefill and any
/// field errors from the last submission.
#[derive(Debug, Serialize)]
pub struct FormView<D: Serialize> {
    pub kind: &'static str,
    pub data: D,
    pub errors: FormErrors,
}

#[derive(Debug, Serialize)]
pub struct FormContext<D: Serialize> {
    pub form: FormView<D>,
}

impl<D: Serialize> FormContext<D> {
    pub fn new(kind: &'static str, data: D, errors: FormErrors) -> Self {
        Self {
            form: FormView { kind, data, errors },
        }
    }

    pub fn blank(kind: &'static str, data: D) -> Self {
        Self::new(kind, data, FormErrors::new())
    }
}

/// Credentials are never echoed back; only the username is kept.
#[derive(Debug, Default, Serialize)]
pub struct UsernameData {
    pub username: String,
}
