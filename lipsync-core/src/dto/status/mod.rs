//! Status DTOs for the `/status/{video_id}` route

use serde::{Deserialize, Serialize};

use crate::domain::status::StatusSnapshot;

/// Response of `GET /status/{video_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub result_url: Option<String>,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl From<StatusResponse> for StatusSnapshot {
    fn from(response: StatusResponse) -> Self {
        let mut snapshot = StatusSnapshot::new(response.status);
        snapshot.result_url = response.result_url;
        snapshot.stream_url = response.stream_url;
        snapshot.download_url = response.download_url;
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::StatusKind;

    #[test]
    fn test_status_response_conversion() {
        let response: StatusResponse = serde_json::from_str(
            r#"{"status": "done", "result_url": "https://x/v1.mp4"}"#,
        )
        .unwrap();

        let snapshot: StatusSnapshot = response.into();
        assert_eq!(snapshot.classified, StatusKind::Ready);
        assert_eq!(snapshot.result_url.as_deref(), Some("https://x/v1.mp4"));
        assert!(snapshot.stream_url.is_none());
    }

    #[test]
    fn test_status_response_with_unrecognized_status() {
        let response: StatusResponse =
            serde_json::from_str(r#"{"status": "uploading"}"#).unwrap();

        let snapshot: StatusSnapshot = response.into();
        assert_eq!(snapshot.raw_status, "uploading");
        assert_eq!(snapshot.classified, StatusKind::Unknown);
    }
}
