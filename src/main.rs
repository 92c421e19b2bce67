use clap::Parser;
use notekeeper::cli::{handle_add_user, handle_list_notes, handle_serve, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("notekeeper=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Serve => handle_serve(config),
        Commands::AddUser { username, password } => handle_add_user(config, username, password),
        Commands::ListNotes { username, json } => handle_list_notes(config, username, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
