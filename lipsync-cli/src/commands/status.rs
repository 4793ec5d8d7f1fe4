//! Status and health command handlers

use anyhow::{Context, Result};
use colored::*;
use lipsync_core::domain::status::StatusSnapshot;
use lipsync_session::Config;

use super::studio_client;
use crate::output::print_status_details;

/// Handle `lipsync status <video_id>`
pub async fn handle_status(video_id: &str, json: bool, config: &Config) -> Result<()> {
    let client = studio_client(config)?;

    let response = client
        .get_status(video_id)
        .await
        .with_context(|| format!("Failed to fetch status of video {}", video_id))?;
    let snapshot = StatusSnapshot::from(response);

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_status_details(video_id, &snapshot);
    }

    Ok(())
}

/// Handle `lipsync ping`
pub async fn handle_ping(config: &Config) -> Result<()> {
    let client = studio_client(config)?;

    let message = client
        .health()
        .await
        .with_context(|| format!("Backend at {} is not reachable", client.base_url()))?;

    println!("{} {} {}", "✓".green(), client.base_url().bold(), message.dimmed());
    Ok(())
}
