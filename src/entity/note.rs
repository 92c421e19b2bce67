// src/entity/note.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// A note owned by exactly one user.
///
/// `author_id` is fixed at construction; the store never updates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(title: String, text: String, slug: String, author_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            text,
            slug,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_view(&self) -> NoteView {
        NoteView {
            id: self.id.to_string(),
            title: self.title.clone(),
            text: self.text.clone(),
            slug: self.slug.clone(),
        }
    }
}

/// The part of a note that is rendered into page contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteView {
    pub id: String,
    pub title: String,
    pub text: String,
    pub slug: String,
}
