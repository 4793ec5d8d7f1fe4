//! Generate command handler
//!
//! Submits a script for async rendering and follows the session controller's
//! updates until the video is ready, fails, or the user interrupts.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::*;
use lipsync_core::domain::generation::{GenerationRequest, Mode};
use lipsync_session::{Config, Outcome, Phase, SessionController, SessionView};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

use super::studio_client;
use crate::output::{colorize_phase, print_progress, print_submission};

/// Arguments of `lipsync generate`
#[derive(Args)]
pub struct GenerateArgs {
    /// Script for the presenter to speak
    #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
    text: Option<String>,

    /// Read the script from a file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Presenter id (defaults to the first known presenter)
    #[arg(short, long)]
    presenter: Option<String>,

    /// Return right after submission instead of following progress
    #[arg(long)]
    detach: bool,

    /// Print the final session as JSON
    #[arg(long)]
    json: bool,
}

/// Handle `lipsync generate`
pub async fn handle_generate(args: GenerateArgs, config: &Config) -> Result<()> {
    let script = match (args.text, &args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script file: {}", path.display()))?,
        (None, None) => bail!("Provide a script with --text or --file"),
    };
    let presenter = args
        .presenter
        .unwrap_or_else(|| config.presenters.default_id().to_string());

    let client = studio_client(config)?;
    let controller = SessionController::with_mode(Arc::new(client), config, Mode::Async);
    let mut updates = controller.subscribe();

    println!(
        "{} Submitting script ({} chars) for presenter {}",
        "▸".cyan(),
        script.chars().count(),
        presenter.bold()
    );

    let submission = controller
        .submit(GenerationRequest::new(script, presenter))
        .await
        .context("Submission failed")?;
    print_submission(&submission);

    if args.detach {
        controller.teardown();
        println!();
        println!(
            "Follow progress with: {}",
            format!("lipsync status {}", submission.video_id).bold()
        );
        return Ok(());
    }

    println!();
    println!(
        "{}",
        format!("Polling every {:?} (Ctrl-C to stop)...", config.poll_interval).dimmed()
    );

    let view = follow(&controller, &mut updates).await;
    controller.teardown();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    }

    println!();
    match view.phase {
        Phase::Terminal(Outcome::Ready) => {
            println!("{} {}", "✓".green(), "Video is ready".bold());
            if let Some(url) = view.latest_status.as_ref().and_then(|s| s.playable_url()) {
                println!("  {}", url);
            }
            Ok(())
        }
        Phase::Terminal(Outcome::Failed) => {
            let message = view
                .last_error
                .unwrap_or_else(|| "Video generation failed".to_string());
            println!("{} {}", "✗".red(), message.red());
            bail!("Video {} failed to render", submission.video_id)
        }
        phase => {
            println!(
                "{} Stopped following in phase {}. The backend keeps rendering video {}.",
                "⚠".yellow(),
                colorize_phase(phase),
                submission.video_id
            );
            Ok(())
        }
    }
}

/// Prints status changes until the session settles or Ctrl-C is pressed
async fn follow(
    controller: &SessionController,
    updates: &mut watch::Receiver<SessionView>,
) -> SessionView {
    let mut last_status: Option<String> = None;
    let mut last_failures = 0;

    loop {
        let view = updates.borrow_and_update().clone();

        if let Some(snapshot) = &view.latest_status {
            if last_status.as_deref() != Some(snapshot.raw_status.as_str()) {
                print_progress(snapshot);
                last_status = Some(snapshot.raw_status.clone());
            }
        }

        if view.poll_failures > last_failures {
            println!(
                "  {} {}",
                "⚠".yellow(),
                format!(
                    "Status check failed ({} so far), retrying...",
                    view.poll_failures
                )
                .yellow()
            );
            last_failures = view.poll_failures;
        }

        if view.is_settled() {
            return view;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    return controller.snapshot();
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{}", "Interrupted, stopping status polling".yellow());
                controller.teardown();
                return controller.snapshot();
            }
        }
    }
}
