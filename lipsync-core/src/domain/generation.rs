//! Generation domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a submission is rendered by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Script is rendered to a video file; progress is observed by polling
    #[default]
    Async,
    /// A live conversation session is opened; there is nothing to poll
    Realtime,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Async => f.write_str("async"),
            Self::Realtime => f.write_str("realtime"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "async" => Ok(Self::Async),
            "realtime" | "live" => Ok(Self::Realtime),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

/// What the user asked the provider to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub text: String,
    pub presenter: String,
}

impl GenerationRequest {
    pub fn new(text: impl Into<String>, presenter: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            presenter: presenter.into(),
        }
    }

    /// Same request with the presenter id trimmed, as it is sent to the backend
    pub fn normalized(self) -> Self {
        let presenter = self.presenter.trim();
        if presenter.len() == self.presenter.len() {
            return self;
        }

        Self {
            presenter: presenter.to_string(),
            text: self.text,
        }
    }

    /// True when the script has no visible content
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Accepted submission, as reported by the backend
///
/// For realtime sessions `video_id` holds the conversation id and
/// `hosted_url` the join URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub video_id: String,
    pub initial_status: String,
    pub thumbnail_url: Option<String>,
    pub hosted_url: Option<String>,
    pub session_token: Option<String>,
}
