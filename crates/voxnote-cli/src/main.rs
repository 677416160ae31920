use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "voxnote", version, about = "Voice-note tasks and events, synced to your calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calendar authorization
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Event management
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Push and pull against the remote calendar
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = voxnote_core::init() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Auth { action } => commands::auth::run(action).await,
        Commands::Task { action } => commands::task::run(action).await,
        Commands::Event { action } => commands::event::run(action).await,
        Commands::Sync { action } => commands::sync::run(action).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
