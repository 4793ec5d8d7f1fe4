//! Status-related API endpoints

use crate::StudioClient;
use crate::error::{ClientError, Result};
use lipsync_core::dto::status::StatusResponse;

impl StudioClient {
    /// Get the current rendering status of a video
    ///
    /// # Arguments
    /// * `video_id` - Id returned by [`StudioClient::create_video`]
    ///
    /// # Returns
    /// The raw status as reported by the backend (unclassified)
    pub async fn get_status(&self, video_id: &str) -> Result<StatusResponse> {
        let video_id = video_id.trim();
        if video_id.is_empty() || video_id.contains('/') {
            return Err(ClientError::InvalidRequest(format!(
                "invalid video id '{}'",
                video_id
            )));
        }

        let url = format!("{}/status/{}", self.base_url, video_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
