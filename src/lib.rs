pub mod access;
pub mod auth;
pub mod cli;
pub mod entity;
pub mod error;
pub mod forms;
pub mod notes;
pub mod settings;
pub mod slug;
pub mod storage;
pub mod web;

pub use error::{NotekeeperError, Result};
pub use settings::Settings;
pub use storage::SqliteStore;
pub use web::{router, AppState};
