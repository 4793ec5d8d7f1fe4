//! Lipsync CLI
//!
//! Command-line front end for the lip-sync studio: submits scripts, follows
//! rendering progress and opens live sessions.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, handle_command};
use lipsync_session::Config;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lipsync")]
#[command(about = "Lip-sync video studio CLI", long_about = None)]
struct Cli {
    /// Studio backend URL
    #[arg(long, env = "LIPSYNC_API_URL", global = true)]
    api_url: Option<String>,

    /// Status poll interval in milliseconds (overrides LIPSYNC_POLL_INTERVAL_MS)
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,

    /// Log controller and HTTP activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(Config::from_env(), cli.api_url, cli.poll_interval_ms)?;
    debug!(
        "Using backend {} (poll interval: {:?}, timeout: {:?})",
        config.api_url, config.poll_interval, config.request_timeout
    );

    handle_command(cli.command, &config).await
}

/// Applies command-line overrides on top of the environment config
fn resolve_config(
    mut config: Config,
    api_url: Option<String>,
    poll_interval_ms: Option<u64>,
) -> Result<Config> {
    if let Some(api_url) = api_url {
        config.api_url = api_url;
    }
    if let Some(interval) = poll_interval_ms {
        config.poll_interval = Duration::from_millis(interval);
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "lipsync=debug,lipsync_session=debug,lipsync_client=debug"
    } else {
        "lipsync=info,lipsync_session=info,lipsync_client=info"
    }
}

/// Logs go to stderr so command output on stdout stays pipeable
fn init_tracing(verbose: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
