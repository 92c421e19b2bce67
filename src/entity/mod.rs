mod note;
mod user;

pub use note::{Note, NoteView};
pub use user::{User, UserId};
