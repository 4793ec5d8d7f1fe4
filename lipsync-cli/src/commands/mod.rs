//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod generate;
mod live;
mod status;

pub use generate::GenerateArgs;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use lipsync_client::StudioClient;
use lipsync_session::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Render a script into a lip-synced video and follow its progress
    Generate(GenerateArgs),
    /// Start a realtime conversation with a presenter
    Live {
        /// Presenter id (defaults to the first known presenter)
        #[arg(short, long)]
        presenter: Option<String>,

        /// Print the session as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current status of a submitted video
    Status {
        /// Video id returned by `generate`
        video_id: String,

        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },
    /// List presenters a request may use
    Presenters,
    /// Check that the studio backend is reachable
    Ping,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Generate(args) => generate::handle_generate(args, config).await,
        Commands::Live { presenter, json } => live::handle_live(presenter, json, config).await,
        Commands::Status { video_id, json } => status::handle_status(&video_id, json, config).await,
        Commands::Presenters => {
            list_presenters(config);
            Ok(())
        }
        Commands::Ping => status::handle_ping(config).await,
    }
}

/// Builds the HTTP client every command talks through
fn studio_client(config: &Config) -> Result<StudioClient> {
    StudioClient::with_timeout(config.api_url.clone(), config.request_timeout)
        .context("Failed to build HTTP client")
}

fn list_presenters(config: &Config) {
    let default_id = config.presenters.default_id();

    println!(
        "{}",
        format!("{} presenter(s) available:", config.presenters.ids().len()).bold()
    );
    for id in config.presenters.ids() {
        if id == default_id {
            println!("  {} {} {}", "▸".cyan(), id.bold(), "(default)".dimmed());
        } else {
            println!("  {} {}", "▸".cyan(), id);
        }
    }
}
