mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{handle_add_user, handle_list_notes, handle_serve};
