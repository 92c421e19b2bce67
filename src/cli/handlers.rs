use std::path::Path;

use crate::access::Identity;
use crate::auth;
use crate::entity::Note;
use crate::error::{NotekeeperError, Result};
use crate::forms::SignupForm;
use crate::notes;
use crate::settings::Settings;
use crate::storage::SqliteStore;
use crate::web;

fn open_store(settings: &Settings) -> Result<SqliteStore> {
    SqliteStore::open(&settings.database.path)
}

pub fn handle_serve(config: Option<&Path>) -> Result<()> {
    let settings = Settings::load(config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(web::serve(settings))
}

pub fn handle_add_user(config: Option<&Path>, username: String, password: String) -> Result<()> {
    let settings = Settings::load(config)?;
    let store = open_store(&settings)?;

    let form = SignupForm {
        username,
        password1: password.clone(),
        password2: password,
    };
    let user = auth::signup(&store, &form)?;

    println!("Created user {} ({})", user.username, user.id);
    Ok(())
}

pub fn handle_list_notes(config: Option<&Path>, username: String, json: bool) -> Result<()> {
    let settings = Settings::load(config)?;
    let store = open_store(&settings)?;

    let user = store
        .get_user_by_username(&username)?
        .ok_or(NotekeeperError::UserNotFound(username))?;
    let notes = notes::list_notes(&store, Identity::User(user.id))?;

    if json {
        let views: Vec<_> = notes.iter().map(Note::to_view).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else if notes.is_empty() {
        println!("No notes for {}", user.username);
    } else {
        for note in &notes {
            println!("{:<40} {}", note.slug, note.title);
        }
    }

    Ok(())
}
