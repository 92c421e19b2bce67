use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "notekeeper")]
#[command(version, about = "A small multi-user notes service")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a TOML settings file (defaults to ./notekeeper.toml if present)
    #[arg(long, short = 'c', global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve,

    /// Create a user account
    AddUser {
        /// Login name
        username: String,

        /// Initial password (at least 8 characters)
        #[arg(long)]
        password: String,
    },

    /// List the notes a user owns
    ListNotes {
        /// Owner's login name
        username: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
