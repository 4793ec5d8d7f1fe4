//! Live command handler
//!
//! Opens a realtime conversation session. There is nothing to poll: the
//! controller goes straight from submitting to ready.

use anyhow::{Context, Result};
use colored::*;
use lipsync_core::domain::generation::{GenerationRequest, Mode};
use lipsync_session::{Config, SessionController};
use std::sync::Arc;

use super::studio_client;

/// Handle `lipsync live`
pub async fn handle_live(presenter: Option<String>, json: bool, config: &Config) -> Result<()> {
    let presenter = presenter.unwrap_or_else(|| config.presenters.default_id().to_string());

    let client = studio_client(config)?;
    let controller = SessionController::with_mode(Arc::new(client), config, Mode::Realtime);

    let session = controller
        .submit(GenerationRequest::new(String::new(), presenter))
        .await
        .context("Failed to start live session")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
        controller.teardown();
        return Ok(());
    }

    println!("{} {}", "✓".green(), "Live session ready".bold());
    println!("  Conversation ID: {}", session.video_id.cyan());
    match &session.hosted_url {
        Some(url) => println!("  Join at:         {}", url),
        None => println!("  Join at:         {}", "(backend sent no URL)".dimmed()),
    }
    if let Some(token) = &session.session_token {
        println!("  Token:           {}", token.dimmed());
    }

    controller.teardown();
    Ok(())
}
