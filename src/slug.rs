//! Slug derivation and uniqueness checks for notes.
//!
//! [`slugify`] is pure: the same title always yields the same slug.
//! [`resolve_slug`] combines it with a caller-supplied uniqueness probe so the
//! rule can be exercised without a database.

use crate::error::{NotekeeperError, Result};

/// Appended to a conflicting slug in the field error shown to the submitter.
pub const WARNING: &str = " - this slug already exists, choose a unique value!";

/// Maximum stored slug length, in characters.
pub const MAX_SLUG_LENGTH: usize = 100;

const FALLBACK_SLUG: &str = "untitled";

/// ASCII rendering of a Cyrillic letter, lowercase.
fn transliterate(c: char) -> Option<&'static str> {
    let lower = c.to_lowercase().next().unwrap_or(c);
    let ascii = match lower {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        'і' => "i",
        'ї' => "yi",
        'є' => "ye",
        'ґ' => "g",
        _ => return None,
    };
    Some(ascii)
}

/// Convert a title to a URL-safe slug
///
/// - Transliterates Cyrillic to ASCII, drops other non-ASCII characters
/// - Converts to lowercase
/// - Replaces spaces and punctuation with single hyphens
/// - Trims leading/trailing hyphens
/// - Truncates to [`MAX_SLUG_LENGTH`]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true; // Start true to trim leading hyphens

    for c in title.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if let Some(ascii) = transliterate(c) {
            if !ascii.is_empty() {
                slug.push_str(ascii);
                last_was_hyphen = false;
            }
        } else if c.is_whitespace() || c.is_ascii_punctuation() {
            if !last_was_hyphen {
                slug.push('-');
                last_was_hyphen = true;
            }
        }
    }

    if slug.len() > MAX_SLUG_LENGTH {
        // Everything pushed is ASCII, so byte and char offsets agree.
        slug.truncate(MAX_SLUG_LENGTH);
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        slug = FALLBACK_SLUG.to_string();
    }

    slug
}

/// Produce the slug to persist for a submitted note.
///
/// A non-empty `submitted` slug is used as-is; otherwise the slug is derived
/// from `title`. Either way `is_taken` is asked whether another note already
/// holds it (the caller excludes the note being edited).
pub fn resolve_slug<F>(title: &str, submitted: Option<&str>, is_taken: F) -> Result<String>
where
    F: FnOnce(&str) -> Result<bool>,
{
    let slug = match submitted.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => slugify(title),
    };

    if is_taken(&slug)? {
        tracing::warn!(slug = %slug, "rejected duplicate slug");
        return Err(NotekeeperError::DuplicateSlug { slug });
    }

    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Note title"), "note-title");
        assert_eq!(slugify("Use PostgreSQL"), "use-postgresql");
    }

    #[test]
    fn test_slugify_special_chars() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("API v2.0 (beta)"), "api-v2-0-beta");
    }

    #[test]
    fn test_slugify_consecutive_specials() {
        assert_eq!(slugify("Hello   World"), "hello-world");
        assert_eq!(slugify("---test---"), "test");
    }

    #[test]
    fn test_slugify_cyrillic() {
        assert_eq!(slugify("Заголовок"), "zagolovok");
        assert_eq!(slugify("Щука и ёж"), "schuka-i-yozh");
        assert_eq!(slugify("Подъезд"), "podezd");
    }

    #[test]
    fn test_slugify_drops_untransliterable() {
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("日本語"), "untitled");
    }

    #[test]
    fn test_slugify_truncates() {
        let title = "a".repeat(150);
        assert_eq!(slugify(&title).len(), MAX_SLUG_LENGTH);

        let title = format!("{} tail", "b".repeat(MAX_SLUG_LENGTH - 1));
        let slug = slugify(&title);
        assert!(!slug.ends_with('-'));
        assert_eq!(slug.len(), MAX_SLUG_LENGTH - 1);
    }

    #[test]
    fn test_slugify_is_deterministic() {
        assert_eq!(slugify("Same Title"), slugify("Same Title"));
    }

    #[test]
    fn test_resolve_uses_submitted_slug() {
        let slug = resolve_slug("Note title", Some("note-slug"), |_| Ok(false)).unwrap();
        assert_eq!(slug, "note-slug");
    }

    #[test]
    fn test_resolve_derives_from_title() {
        assert_eq!(
            resolve_slug("Note title", None, |_| Ok(false)).unwrap(),
            "note-title"
        );
        assert_eq!(
            resolve_slug("Note title", Some("  "), |_| Ok(false)).unwrap(),
            "note-title"
        );
    }

    #[test]
    fn test_resolve_checks_derived_slug() {
        let mut probed = String::new();
        let err = resolve_slug("Note title", None, |s| {
            probed = s.to_string();
            Ok(true)
        })
        .unwrap_err();
        assert_eq!(probed, "note-title");
        assert_eq!(err.to_string(), format!("note-title{}", WARNING));
    }

    #[test]
    fn test_resolve_duplicate_names_slug() {
        match resolve_slug("x", Some("taken"), |_| Ok(true)) {
            Err(NotekeeperError::DuplicateSlug { slug }) => assert_eq!(slug, "taken"),
            other => panic!("Expected DuplicateSlug, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_propagates_probe_error() {
        let err = resolve_slug("x", None, |_| Err(NotekeeperError::Storage("down".into())));
        assert!(matches!(err, Err(NotekeeperError::Storage(_))));
    }
}
