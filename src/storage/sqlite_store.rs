use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use uuid::Uuid;

use crate::entity::{Note, User, UserId};
use crate::error::{NotekeeperError, Result};

/// Durable storage for users and notes.
///
/// `notes.slug` carries a `UNIQUE` constraint; a violation on insert or
/// update surfaces as [`NotekeeperError::DuplicateSlug`] and nothing is
/// written.
pub struct SqliteStore {
    conn: Connection,
}

const NOTE_COLUMNS: &str = "id, title, text, slug, author_id, created_at, updated_at";

impl SqliteStore {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Fresh private database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                text TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_notes_author ON notes(author_id);
            ",
        )?;
        Ok(())
    }

    // Users

    pub fn create_user(&self, user: &User) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO users (id, username, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    user.id.to_string(),
                    user.username,
                    user.password_hash,
                    user.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    NotekeeperError::UsernameTaken
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
                [id.to_string()],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
                [username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    // Notes

    pub fn insert_note(&self, note: &Note) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO notes ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    NOTE_COLUMNS
                ),
                params![
                    note.id.to_string(),
                    note.title,
                    note.text,
                    note.slug,
                    note.author_id.to_string(),
                    note.created_at.to_rfc3339(),
                    note.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| slug_conflict(e, &note.slug))?;
        Ok(())
    }

    /// Write title, text and slug in one statement. The author is never touched.
    pub fn update_note(&self, note: &Note) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE notes SET title = ?2, text = ?3, slug = ?4, updated_at = ?5
                 WHERE id = ?1",
                params![
                    note.id.to_string(),
                    note.title,
                    note.text,
                    note.slug,
                    note.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| slug_conflict(e, &note.slug))?;
        if changed == 0 {
            return Err(NotekeeperError::NotFound);
        }
        Ok(())
    }

    pub fn delete_note(&self, id: Uuid) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1", [id.to_string()])?;
        if changed == 0 {
            return Err(NotekeeperError::NotFound);
        }
        Ok(())
    }

    pub fn get_note_by_slug(&self, slug: &str) -> Result<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("SELECT {} FROM notes WHERE slug = ?1", NOTE_COLUMNS),
                [slug],
                note_from_row,
            )
            .optional()?;
        Ok(note)
    }

    /// Notes owned by `author`, oldest first.
    pub fn list_notes_by_author(&self, author: UserId) -> Result<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM notes WHERE author_id = ?1 ORDER BY created_at, rowid",
            NOTE_COLUMNS
        ))?;

        let notes = stmt
            .query_map([author.to_string()], note_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    /// Whether a note other than `exclude` already holds `slug`.
    pub fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        let exclude = exclude.map(|id| id.to_string());
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM notes WHERE slug = ?1 AND (?2 IS NULL OR id != ?2)",
                params![slug, exclude],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn count_notes(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
            && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn slug_conflict(e: rusqlite::Error, slug: &str) -> NotekeeperError {
    if is_unique_violation(&e) {
        NotekeeperError::DuplicateSlug {
            slug: slug.to_string(),
        }
    } else {
        e.into()
    }
}

fn parse_uuid(idx: usize, value: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn parse_timestamp(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(parse_uuid(0, row.get(0)?)?),
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: parse_timestamp(3, row.get(3)?)?,
    })
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: parse_uuid(0, row.get(0)?)?,
        title: row.get(1)?,
        text: row.get(2)?,
        slug: row.get(3)?,
        author_id: UserId(parse_uuid(4, row.get(4)?)?),
        created_at: parse_timestamp(5, row.get(5)?)?,
        updated_at: parse_timestamp(6, row.get(6)?)?,
    })
}

// Implement From for rusqlite::Error
impl From<rusqlite::Error> for NotekeeperError {
    fn from(e: rusqlite::Error) -> Self {
        NotekeeperError::Storage(format!("SQLite error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_user(name: &str) -> (SqliteStore, User) {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = User::new(name.to_string(), "hash".to_string());
        store.create_user(&user).unwrap();
        (store, user)
    }

    #[test]
    fn test_open_creates_db() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data").join("notes.db");
        let _store = SqliteStore::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_reopen_keeps_data() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .create_user(&User::new("author".into(), "hash".into()))
                .unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert!(store.get_user_by_username("author").unwrap().is_some());
    }

    #[test]
    fn test_username_unique() {
        let (store, _) = store_with_user("author");
        let err = store
            .create_user(&User::new("author".into(), "other".into()))
            .unwrap_err();
        assert!(matches!(err, NotekeeperError::UsernameTaken));
    }

    #[test]
    fn test_insert_and_get_note() {
        let (store, user) = store_with_user("author");
        let note = Note::new("Title".into(), "Text".into(), "title".into(), user.id);
        store.insert_note(&note).unwrap();

        let loaded = store.get_note_by_slug("title").unwrap().unwrap();
        assert_eq!(loaded.id, note.id);
        assert_eq!(loaded.author_id, user.id);
        assert_eq!(loaded.text, "Text");
        assert!(store.get_note_by_slug("missing").unwrap().is_none());
    }

    #[test]
    fn test_slug_unique_constraint() {
        let (store, user) = store_with_user("author");
        store
            .insert_note(&Note::new("A".into(), "a".into(), "same".into(), user.id))
            .unwrap();

        let err = store
            .insert_note(&Note::new("B".into(), "b".into(), "same".into(), user.id))
            .unwrap_err();
        match err {
            NotekeeperError::DuplicateSlug { slug } => assert_eq!(slug, "same"),
            other => panic!("Expected DuplicateSlug, got {:?}", other),
        }
        assert_eq!(store.count_notes().unwrap(), 1);
    }

    #[test]
    fn test_update_to_taken_slug_is_rejected() {
        let (store, user) = store_with_user("author");
        store
            .insert_note(&Note::new("A".into(), "a".into(), "first".into(), user.id))
            .unwrap();
        let mut second = Note::new("B".into(), "b".into(), "second".into(), user.id);
        store.insert_note(&second).unwrap();

        second.title = "Changed".into();
        second.slug = "first".into();
        assert!(matches!(
            store.update_note(&second),
            Err(NotekeeperError::DuplicateSlug { .. })
        ));

        let unchanged = store.get_note_by_slug("second").unwrap().unwrap();
        assert_eq!(unchanged.title, "B");
    }

    #[test]
    fn test_slug_exists_excludes_self() {
        let (store, user) = store_with_user("author");
        let note = Note::new("A".into(), "a".into(), "slug".into(), user.id);
        store.insert_note(&note).unwrap();

        assert!(store.slug_exists("slug", None).unwrap());
        assert!(!store.slug_exists("slug", Some(note.id)).unwrap());
        assert!(store.slug_exists("slug", Some(Uuid::new_v4())).unwrap());
        assert!(!store.slug_exists("other", None).unwrap());
    }

    #[test]
    fn test_list_filters_by_author() {
        let (store, author) = store_with_user("author");
        let reader = User::new("reader".into(), "hash".into());
        store.create_user(&reader).unwrap();

        store
            .insert_note(&Note::new("Mine".into(), "x".into(), "mine".into(), author.id))
            .unwrap();
        store
            .insert_note(&Note::new("Theirs".into(), "y".into(), "theirs".into(), reader.id))
            .unwrap();

        let mine = store.list_notes_by_author(author.id).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].slug, "mine");

        let theirs = store.list_notes_by_author(reader.id).unwrap();
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].slug, "theirs");
    }

    #[test]
    fn test_delete_note() {
        let (store, user) = store_with_user("author");
        let note = Note::new("A".into(), "a".into(), "a".into(), user.id);
        store.insert_note(&note).unwrap();

        store.delete_note(note.id).unwrap();
        assert_eq!(store.count_notes().unwrap(), 0);
        assert!(matches!(
            store.delete_note(note.id),
            Err(NotekeeperError::NotFound)
        ));
    }
}
