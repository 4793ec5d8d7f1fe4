//! Generation-related API endpoints

use crate::StudioClient;
use crate::error::{ClientError, Result};
use lipsync_core::domain::generation::{GenerationRequest, SubmissionResult};
use lipsync_core::dto::generation::{
    ConversationCreated, CreateConversation, CreateVideo, VideoCreated,
};
use tracing::debug;

impl StudioClient {
    // =============================================================================
    // Video Generation
    // =============================================================================

    /// Submit a script for asynchronous rendering
    ///
    /// # Arguments
    /// * `request` - Script text and presenter id
    ///
    /// # Returns
    /// The accepted submission, including the video id to poll
    pub async fn create_video(&self, request: &GenerationRequest) -> Result<SubmissionResult> {
        let url = format!("{}/generate", self.base_url);
        debug!("POST {} (presenter: {})", url, request.presenter);

        let response = self
            .client
            .post(&url)
            .json(&CreateVideo {
                text: request.text.clone(),
                presenter: request.presenter.clone(),
            })
            .send()
            .await?;

        let created: VideoCreated = self.handle_response(response).await?;
        if created.video_id.trim().is_empty() {
            return Err(ClientError::ParseError(
                "Backend accepted the video but returned an empty video_id".to_string(),
            ));
        }

        Ok(created.into())
    }

    // =============================================================================
    // Realtime Conversation
    // =============================================================================

    /// Open a live conversation with a presenter
    ///
    /// # Arguments
    /// * `presenter` - Presenter id
    ///
    /// # Returns
    /// The conversation id and join URL, mapped onto a [`SubmissionResult`]
    pub async fn start_conversation(&self, presenter: &str) -> Result<SubmissionResult> {
        let url = format!("{}/conversation", self.base_url);
        debug!("POST {} (presenter: {})", url, presenter);

        let response = self
            .client
            .post(&url)
            .json(&CreateConversation {
                presenter: presenter.to_string(),
            })
            .send()
            .await?;

        let created: ConversationCreated = self.handle_response(response).await?;
        Ok(created.into())
    }

    // =============================================================================
    // Health
    // =============================================================================

    /// Fetch the backend's banner message from `/`
    pub async fn health(&self) -> Result<String> {
        let url = format!("{}/", self.base_url);
        let response = self.client.get(&url).send().await?;

        let body: serde_json::Value = self.handle_response(response).await?;
        Ok(body
            .get("message")
            .and_then(|message| message.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()))
    }
}
