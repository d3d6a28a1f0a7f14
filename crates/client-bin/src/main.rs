//! Bazaar auth CLI - drives login, signup verification, MFA, and
//! privileged-action challenges from the terminal.

mod commands;
mod console;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use client_config_and_utils::{init_logging, Config, Paths};

/// Bazaar authentication command-line interface.
#[derive(Parser)]
#[command(name = "bazaar-auth")]
#[command(about = "Bazaar account login, verification and session management")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Base directory for session and config files. Defaults to ~/.bazaar
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with username and password, following any further challenges
    Login {
        /// Username to log in as (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,

        /// Where to land after authentication (relative path)
        #[arg(long)]
        redirect_to: Option<String>,
    },
    /// Resume a challenge from a /challenge?... URL (e.g. an emailed link)
    Challenge {
        /// The challenge URL
        url: String,
    },
    /// Show the current session status
    Status,
    /// Clear the local session and invalidate it server-side (best effort)
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli.log_level);

    // Load configuration
    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let config = Config::load(&paths)?;

    match cli.command {
        Commands::Login {
            username,
            redirect_to,
        } => {
            commands::login::run(&config, &paths, username, redirect_to).await?;
        }
        Commands::Challenge { url } => {
            commands::challenge::run(&config, &paths, &url).await?;
        }
        Commands::Status => {
            commands::status::run(&paths)?;
        }
        Commands::Logout => {
            commands::logout::run(&config, &paths).await?;
        }
    }

    Ok(())
}
