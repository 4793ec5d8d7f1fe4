//! Lipsync HTTP Client
//!
//! A small, type-safe HTTP client for the lip-sync studio backend.
//!
//! The session controller never talks to reqwest directly: it depends on the
//! [`StudioApi`] trait, which [`StudioClient`] implements over HTTP and tests
//! implement in memory.
//!
//! # Example
//!
//! ```no_run
//! use lipsync_client::StudioClient;
//! use lipsync_core::domain::generation::{GenerationRequest, Mode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StudioClient::new("http://localhost:8000");
//!
//!     let submission = client
//!         .create_video(&GenerationRequest::new("Hello world", "emma"))
//!         .await?;
//!
//!     println!("Submitted video: {}", submission.video_id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod generation;
mod status;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use lipsync_core::dto::status::StatusResponse;

use async_trait::async_trait;
use lipsync_core::domain::generation::{GenerationRequest, Mode, SubmissionResult};
use lipsync_core::dto::generation::ErrorBody;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Collaborator interface consumed by the session controller
#[async_trait]
pub trait StudioApi: Send + Sync {
    /// Submit a request to the route matching `mode`
    ///
    /// Async submissions go to `/generate`, realtime ones to `/conversation`.
    async fn submit_generation(
        &self,
        request: &GenerationRequest,
        mode: Mode,
    ) -> Result<SubmissionResult>;

    /// Fetch the raw status of a submitted video
    async fn fetch_status(&self, video_id: &str) -> Result<StatusResponse>;
}

/// HTTP client for the studio backend
#[derive(Debug, Clone)]
pub struct StudioClient {
    /// Base URL of the backend (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl StudioClient {
    /// Create a new studio client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the backend API (e.g., "http://localhost:8000")
    ///
    /// # Example
    /// ```
    /// use lipsync_client::StudioClient;
    ///
    /// let client = StudioClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new studio client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success responses are turned into [`ClientError::ApiError`],
    /// carrying the body's `detail` field when the backend sent one.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|error| error.detail_message());

            let message = match (&detail, body.trim()) {
                (Some(detail), _) => detail.clone(),
                (None, "") => status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
                (None, body) => body.to_string(),
            };

            return Err(ClientError::api_error(status.as_u16(), message, detail));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[async_trait]
impl StudioApi for StudioClient {
    async fn submit_generation(
        &self,
        request: &GenerationRequest,
        mode: Mode,
    ) -> Result<SubmissionResult> {
        match mode {
            Mode::Async => self.create_video(request).await,
            Mode::Realtime => self.start_conversation(&request.presenter).await,
        }
    }

    async fn fetch_status(&self, video_id: &str) -> Result<StatusResponse> {
        self.get_status(video_id).await
    }
}
