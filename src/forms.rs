//! Submitted form payloads and their field-level validation.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::slug::MAX_SLUG_LENGTH;

pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Key under which errors not tied to a single field are collected.
pub const NON_FIELD_ERRORS: &str = "__all__";

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap());
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());

/// Field name → messages, in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                first = false;
                if field == NON_FIELD_ERRORS {
                    write!(f, "{}", message)?;
                } else {
                    write!(f, "{}: {}", field, message)?;
                }
            }
        }
        Ok(())
    }
}

fn required(errors: &mut FormErrors, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, "This field is required.");
        return false;
    }
    true
}

fn max_length(errors: &mut FormErrors, field: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max, len
            ),
        );
    }
}

/// Create/edit payload for a note. An empty `slug` means "derive it".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteForm {
    pub title: String,
    pub text: String,
    pub slug: String,
}

impl NoteForm {
    /// Field checks that don't need the store. Slug uniqueness is resolved
    /// afterwards by [`crate::slug::resolve_slug`].
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();

        if required(&mut errors, "title", &self.title) {
            max_length(&mut errors, "title", self.title.trim(), MAX_TITLE_LENGTH);
        }
        required(&mut errors, "text", &self.text);

        let slug = self.slug.trim();
        if !slug.is_empty() {
            max_length(&mut errors, "slug", slug, MAX_SLUG_LENGTH);
            if !SLUG_RE.is_match(slug) {
                errors.add(
                    "slug",
                    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
                );
            }
        }

        errors.into_result()
    }

    pub fn submitted_slug(&self) -> Option<&str> {
        let slug = self.slug.trim();
        (!slug.is_empty()).then_some(slug)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        required(&mut errors, "username", &self.username);
        required(&mut errors, "password", &self.password);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();

        let username = self.username.trim();
        if required(&mut errors, "username", username) {
            max_length(&mut errors, "username", username, MAX_USERNAME_LENGTH);
            if !USERNAME_RE.is_match(username) {
                errors.add(
                    "username",
                    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
                );
            }
        }

        if required(&mut errors, "password1", &self.password1)
            && self.password1.chars().count() < MIN_PASSWORD_LENGTH
        {
            errors.add(
                "password1",
                format!(
                    "This password is too short. It must contain at least {} characters.",
                    MIN_PASSWORD_LENGTH
                ),
            );
        }
        if required(&mut errors, "password2", &self.password2) && self.password1 != self.password2
        {
            errors.add("password2", "The two password fields didn't match.");
        }

        errors.into_result()
    }
}
