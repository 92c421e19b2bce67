//! Note use-cases: list, create, read, edit and delete, each gated by the
//! ownership rules in [`crate::access`].
//!
//! Invalid submissions come back as [`NotekeeperError::Validation`] carrying
//! the field errors; nothing is written in that case.

use chrono::Utc;

use crate::access::{author_for_new_note, authorize, Identity};
use crate::entity::Note;
use crate::error::{NotekeeperError, Result};
use crate::forms::{FormErrors, NoteForm};
use crate::slug::resolve_slug;
use crate::storage::SqliteStore;

/// Turn a slug conflict into a field error on `slug`.
fn slug_error(err: NotekeeperError) -> NotekeeperError {
    match err {
        NotekeeperError::DuplicateSlug { .. } => {
            let mut errors = FormErrors::new();
            errors.add("slug", err.to_string());
            NotekeeperError::Validation(errors)
        }
        other => other,
    }
}

/// Notes visible to `identity`: exactly the ones it authored.
pub fn list_notes(store: &SqliteStore, identity: Identity) -> Result<Vec<Note>> {
    let author = identity.user_id().ok_or(NotekeeperError::Unauthenticated)?;
    store.list_notes_by_author(author)
}

pub fn get_note(store: &SqliteStore, identity: Identity, slug: &str) -> Result<Note> {
    if !identity.is_authenticated() {
        return Err(NotekeeperError::Unauthenticated);
    }
    authorize(identity, store.get_note_by_slug(slug)?)
}

pub fn create_note(store: &SqliteStore, identity: Identity, form: &NoteForm) -> Result<Note> {
    let author = author_for_new_note(identity)?;
    form.validate().map_err(NotekeeperError::Validation)?;

    let title = form.title.trim();
    let slug = resolve_slug(title, form.submitted_slug(), |s| store.slug_exists(s, None))
        .map_err(slug_error)?;

    let note = Note::new(title.to_string(), form.text.clone(), slug, author);
    store.insert_note(&note).map_err(slug_error)?;

    tracing::info!(slug = %note.slug, author = %author, "note created");
    Ok(note)
}

/// Replace title, text and slug of a note the caller owns.
pub fn update_note(
    store: &SqliteStore,
    identity: Identity,
    slug: &str,
    form: &NoteForm,
) -> Result<Note> {
    let mut note = get_note(store, identity, slug)?;
    form.validate().map_err(NotekeeperError::Validation)?;

    let title = form.title.trim();
    let new_slug = resolve_slug(title, form.submitted_slug(), |s| {
        store.slug_exists(s, Some(note.id))
    })
    .map_err(slug_error)?;

    note.title = title.to_string();
    note.text = form.text.clone();
    note.slug = new_slug;
    note.updated_at = Utc::now();
    store.update_note(&note).map_err(slug_error)?;

    tracing::info!(slug = %note.slug, "note updated");
    Ok(note)
}

pub fn delete_note(store: &SqliteStore, identity: Identity, slug: &str) -> Result<Note> {
    let note = get_note(store, identity, slug)?;
    store.delete_note(note.id)?;

    tracing::info!(slug = %note.slug, "note deleted");
    Ok(note)
}
