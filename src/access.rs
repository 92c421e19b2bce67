//! Ownership rules for notes.
//!
//! Every note-scoped operation (detail, edit, delete) goes through
//! [`authorize`], which in turn relies on [`can_access`]. A note the caller
//! does not own is reported exactly like a note that does not exist.

use crate::entity::{Note, UserId};
use crate::error::{NotekeeperError, Result};

/// Who is making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User(UserId),
}

impl Identity {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Identity::Anonymous => None,
            Identity::User(id) => Some(*id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::User(_))
    }
}

impl From<Option<UserId>> for Identity {
    fn from(id: Option<UserId>) -> Self {
        id.map_or(Identity::Anonymous, Identity::User)
    }
}

/// The single capability check: only the author may read, edit or delete.
pub fn can_access(identity: Identity, note: &Note) -> bool {
    identity.user_id() == Some(note.author_id)
}

/// Pass `note` through if `identity` may touch it.
///
/// Missing notes and notes owned by someone else both become
/// [`NotekeeperError::NotFound`]; anonymous callers get
/// [`NotekeeperError::Unauthenticated`].
pub fn authorize(identity: Identity, note: Option<Note>) -> Result<Note> {
    if !identity.is_authenticated() {
        return Err(NotekeeperError::Unauthenticated);
    }
    match note {
        Some(note) if can_access(identity, &note) => Ok(note),
        Some(note) => {
            tracing::debug!(slug = %note.slug, "note hidden from non-author");
            Err(NotekeeperError::NotFound)
        }
        None => Err(NotekeeperError::NotFound),
    }
}

/// Any authenticated identity may create notes; the author comes from here,
/// never from the submitted form.
pub fn author_for_new_note(identity: Identity) -> Result<UserId> {
    identity.user_id().ok_or(NotekeeperError::Unauthenticated)
}
