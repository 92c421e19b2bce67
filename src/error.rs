use thiserror::Error;

use crate::forms::FormErrors;

#[derive(Error, Debug)]
pub enum NotekeeperError {
    #[error("Not found")]
    NotFound,

    #[error("{slug}{}", crate::slug::WARNING)]
    DuplicateSlug { slug: String },

    #[error("A user with that username already exists.")]
    UsernameTaken,

    #[error("Please enter a correct username and password.")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid form submission: {0}")]
    Validation(FormErrors),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Password hashing error: {0}")]
    Password(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NotekeeperError>;
