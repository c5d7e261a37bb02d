//! ClipSync CLI — record camera clips and keep them in your library.
//!
//! Usage:
//!   clipsync check                 Check cameras, microphone, and GStreamer
//!   clipsync signup                Create an account and sign in
//!   clipsync login                 Sign in
//!   clipsync logout                Sign out
//!   clipsync whoami                Show the signed-in account
//!   clipsync record [OPTIONS]      Record a clip and upload it
//!   clipsync upload <PATH>         Upload an existing clip
//!   clipsync list                  List your clips, newest first

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod app;
mod commands;

#[derive(Parser)]
#[command(
    name = "clipsync",
    about = "Record camera clips and sync them to your library",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check system capabilities
    Check,

    /// Create an account and sign in
    Signup {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Sign in to an existing account
    Login {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Record a clip until Ctrl+C, then upload it
    Record {
        /// Use the front camera instead of the back camera
        #[arg(long)]
        front: bool,

        /// Keep the clip on disk without uploading it
        #[arg(long)]
        no_upload: bool,
    },

    /// Upload an existing clip
    Upload {
        /// Path or file:// URI of the clip
        path: String,
    },

    /// List your clips, newest first
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => clipsync_common::config::AppConfig::load_from(path),
        None => clipsync_common::config::AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    clipsync_common::logging::init_logging(&config.logging);

    let app = app::App::open(config)?;

    match cli.command {
        Commands::Check => commands::check::run(&app),
        Commands::Signup { email } => commands::auth::signup(&app, email).await,
        Commands::Login { email } => commands::auth::login(&app, email).await,
        Commands::Logout => commands::auth::logout(&app).await,
        Commands::Whoami => commands::auth::whoami(&app).await,
        Commands::Record { front, no_upload } => {
            commands::record::run(&app, front, !no_upload).await
        }
        Commands::Upload { path } => commands::upload::run(&app, &path).await,
        Commands::List => commands::list::run(&app).await,
    }
}
