//! Terminal rendering of submissions, statuses and sessions

use colored::*;
use lipsync_core::domain::generation::SubmissionResult;
use lipsync_core::domain::status::{StatusKind, StatusSnapshot};
use lipsync_session::{Outcome, Phase};

/// Colorize a classified status for display
pub fn colorize_kind(kind: StatusKind) -> ColoredString {
    let label = kind.as_str().to_uppercase();
    match kind {
        StatusKind::Queued => label.yellow(),
        StatusKind::Processing => label.cyan(),
        StatusKind::Ready => label.green(),
        StatusKind::Failed => label.red(),
        StatusKind::Unknown => label.dimmed(),
    }
}

/// Colorize a session phase for display
pub fn colorize_phase(phase: Phase) -> ColoredString {
    let label = phase.to_string().to_uppercase();
    match phase {
        Phase::Idle => label.dimmed(),
        Phase::Submitting | Phase::Polling => label.cyan(),
        Phase::Terminal(Outcome::Ready) => label.green(),
        Phase::Terminal(Outcome::Failed) => label.red(),
    }
}

/// Print an accepted async submission
pub fn print_submission(submission: &SubmissionResult) {
    println!("{}", "Submission accepted:".bold());
    println!("  Video ID:   {}", submission.video_id.cyan());
    println!("  Status:     {}", submission.initial_status);
    if let Some(url) = &submission.hosted_url {
        println!("  Hosted at:  {}", url.dimmed());
    }
    if let Some(url) = &submission.thumbnail_url {
        println!("  Thumbnail:  {}", url.dimmed());
    }
}

/// Print one status line while following a session
pub fn print_progress(snapshot: &StatusSnapshot) {
    println!(
        "  {} {} {} {}",
        "▸".cyan(),
        snapshot.received_at.format("%H:%M:%S").to_string().dimmed(),
        colorize_kind(snapshot.classified),
        format!("({})", snapshot.raw_status).dimmed()
    );
}

/// Print a status snapshot in full
pub fn print_status_details(video_id: &str, snapshot: &StatusSnapshot) {
    println!("{}", "Video Status:".bold());
    println!("  Video ID:   {}", video_id.cyan());
    println!("  Status:     {}", colorize_kind(snapshot.classified));
    println!("  Reported:   {}", snapshot.raw_status.dimmed());

    if let Some(url) = &snapshot.result_url {
        println!("  Result:     {}", url);
    }
    if let Some(url) = &snapshot.stream_url {
        println!("  Stream:     {}", url);
    }
    if let Some(url) = &snapshot.download_url {
        println!("  Download:   {}", url);
    }
}
