//! Generation DTOs for the `/generate` and `/conversation` routes

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::generation::SubmissionResult;

/// Body of `POST /generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVideo {
    pub text: String,
    pub presenter: String,
}

/// Response of `POST /generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoCreated {
    pub video_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub hosted_url: Option<String>,
}

impl From<VideoCreated> for SubmissionResult {
    fn from(created: VideoCreated) -> Self {
        Self {
            video_id: created.video_id,
            initial_status: created.status.unwrap_or_else(|| "queued".to_string()),
            thumbnail_url: created.thumbnail_url,
            hosted_url: created.hosted_url,
            session_token: None,
        }
    }
}

/// Body of `POST /conversation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversation {
    pub presenter: String,
}

/// Response of `POST /conversation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationCreated {
    pub conversation_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conversation_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl From<ConversationCreated> for SubmissionResult {
    fn from(created: ConversationCreated) -> Self {
        Self {
            video_id: created.conversation_id,
            initial_status: created.status.unwrap_or_else(|| "ready".to_string()),
            thumbnail_url: None,
            hosted_url: created.conversation_url,
            session_token: created.token,
        }
    }
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<JsonValue>,
}

impl ErrorBody {
    /// Renders `detail` as a user-facing string
    ///
    /// Plain strings are returned verbatim; structured details (validation
    /// error lists, objects) are rendered as compact JSON.
    pub fn detail_message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            JsonValue::Null => None,
            JsonValue::String(message) if message.trim().is_empty() => None,
            JsonValue::String(message) => Some(message.clone()),
            other => Some(other.to_string()),
        }
    }
}
