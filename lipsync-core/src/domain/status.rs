//! Status domain types
//!
//! The provider reports progress as free-form strings. [`classify`] is the
//! single place where those strings are turned into a [`StatusKind`]; nothing
//! else in the workspace inspects raw status text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized rendering status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Queued,
    Processing,
    Ready,
    Failed,
    Unknown,
}

impl StatusKind {
    /// Whether polling should stop once this status is observed
    ///
    /// `Unknown` is deliberately non-terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw provider status string
///
/// Matching is case-insensitive and ignores surrounding whitespace. Any value
/// outside the known vocabulary maps to [`StatusKind::Unknown`].
///
/// # Example
/// ```
/// use lipsync_core::domain::status::{classify, StatusKind};
///
/// assert_eq!(classify("Completed"), StatusKind::Ready);
/// assert_eq!(classify("stalled"), StatusKind::Unknown);
/// ```
pub fn classify(raw_status: &str) -> StatusKind {
    match raw_status.trim().to_ascii_lowercase().as_str() {
        "ready" | "completed" | "done" => StatusKind::Ready,
        "failed" | "error" => StatusKind::Failed,
        "queued" => StatusKind::Queued,
        "processing" | "rendering" => StatusKind::Processing,
        _ => StatusKind::Unknown,
    }
}

/// Result of a single status poll
///
/// The latest snapshot replaces the previous one; no history is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub raw_status: String,
    pub classified: StatusKind,
    pub result_url: Option<String>,
    pub stream_url: Option<String>,
    pub download_url: Option<String>,
    pub received_at: chrono::DateTime<chrono::Utc>,
}

impl StatusSnapshot {
    /// Builds a snapshot from a raw status string, classifying it
    pub fn new(raw_status: impl Into<String>) -> Self {
        let raw_status = raw_status.into();
        Self {
            classified: classify(&raw_status),
            raw_status,
            result_url: None,
            stream_url: None,
            download_url: None,
            received_at: chrono::Utc::now(),
        }
    }

    /// The best URL to hand to a player, if the provider sent any
    pub fn playable_url(&self) -> Option<&str> {
        self.result_url
            .as_deref()
            .or(self.stream_url.as_deref())
            .or(self.download_url.as_deref())
    }
}
