//! Note pages. Every view except `home` sits behind [`LoginRequired`], and
//! note-scoped views resolve their note through [`crate::notes`], so a
//! non-author gets the same 404 as a missing slug.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Form;

use super::context::{FormContext, ListContext, NoContext, NoteContext, Page};
use super::extract::{found, LoginRequired, Viewer};
use super::{AppState, SUCCESS_URL};
use crate::entity::Note;
use crate::error::{NotekeeperError, Result};
use crate::forms::{FormErrors, NoteForm};
use crate::notes;

const NOTE_FORM: &str = "NoteForm";

fn prefill(note: &Note) -> NoteForm {
    NoteForm {
        title: note.title.clone(),
        text: note.text.clone(),
        slug: note.slug.clone(),
    }
}

/// Re-render an invalid submission, or propagate anything else.
fn form_outcome(page: &'static str, user: Option<String>, form: NoteForm, result: Result<Note>) -> Result<Response> {
    match result {
        Ok(_) => Ok(found(SUCCESS_URL)),
        Err(NotekeeperError::Validation(errors)) => {
            Ok(Page::new(page, user, FormContext::new(NOTE_FORM, form, errors)).into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn home(viewer: Viewer) -> Page<NoContext> {
    Page::new("notes:home", viewer.username, NoContext {})
}

pub async fn list(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
) -> Result<Page<ListContext>> {
    let store = state.store.lock().await;
    let notes = notes::list_notes(&store, user.identity())?;
    Ok(Page::new("notes:list", user.name(), ListContext::new(&notes)))
}

pub async fn success(LoginRequired(user): LoginRequired) -> Page<NoContext> {
    Page::new("notes:success", user.name(), NoContext {})
}

pub async fn add_form(LoginRequired(user): LoginRequired) -> Page<FormContext<NoteForm>> {
    Page::new(
        "notes:add",
        user.name(),
        FormContext::blank(NOTE_FORM, NoteForm::default()),
    )
}

pub async fn add(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Form(form): Form<NoteForm>,
) -> Result<Response> {
    let store = state.store.lock().await;
    let result = notes::create_note(&store, user.identity(), &form);
    form_outcome("notes:add", user.name(), form, result)
}

pub async fn detail(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Path(slug): Path<String>,
) -> Result<Page<NoteContext>> {
    let store = state.store.lock().await;
    let note = notes::get_note(&store, user.identity(), &slug)?;
    Ok(Page::new(
        "notes:detail",
        user.name(),
        NoteContext {
            note: note.to_view(),
        },
    ))
}

pub async fn edit_form(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Path(slug): Path<String>,
) -> Result<Page<FormContext<NoteForm>>> {
    let store = state.store.lock().await;
    let note = notes::get_note(&store, user.identity(), &slug)?;
    Ok(Page::new(
        "notes:edit",
        user.name(),
        FormContext::new(NOTE_FORM, prefill(&note), FormErrors::new()),
    ))
}

pub async fn edit(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Path(slug): Path<String>,
    Form(form): Form<NoteForm>,
) -> Result<Response> {
    let store = state.store.lock().await;
    let result = notes::update_note(&store, user.identity(), &slug, &form);
    form_outcome("notes:edit", user.name(), form, result)
}

/// Confirmation page; the deletion itself is a POST.
pub async fn delete_form(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Path(slug): Path<String>,
) -> Result<Page<NoteContext>> {
    let store = state.store.lock().await;
    let note = notes::get_note(&store, user.identity(), &slug)?;
    Ok(Page::new(
        "notes:delete",
        user.name(),
        NoteContext {
            note: note.to_view(),
        },
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Path(slug): Path<String>,
) -> Result<Response> {
    let store = state.store.lock().await;
    notes::delete_note(&store, user.identity(), &slug)?;
    Ok(found(SUCCESS_URL))
}
