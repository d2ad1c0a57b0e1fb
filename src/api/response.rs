//! `{ success, data }` response envelope and endpoint paths.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::ApiError;

/// Path of the timeline list
pub const TIMELINE_PATH: &str = "/timeline";

/// Path of one timeline's recorded locations
pub const TIMELINE_DETAIL_PATH: &str = "/timeline/detail";

/// Body of every REST response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// The data of a successful response
    ///
    /// `success: false` is [`ApiError::Unsuccessful`]; a successful response
    /// without data is a decode error.
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Unsuccessful);
        }
        self.data
            .ok_or_else(|| ApiError::Decode("missing data".to_string()))
    }
}

/// Decode a response body and unwrap the envelope
pub fn decode_response<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str::<ApiResponse<T>>(body)
        .map_err(|e| ApiError::Decode(e.to_string()))?
        .into_result()
}

/// `{base}/timeline`
pub fn timeline_list_url(base: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), TIMELINE_PATH)
}

/// `{base}/timeline/detail?timelineId={id}`
pub fn timeline_detail_url(base: &str, timeline_id: &str) -> String {
    format!(
        "{}{}?timelineId={}",
        base.trim_end_matches('/'),
        TIMELINE_DETAIL_PATH,
        urlencoding::encode(timeline_id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LocationEvent, Timeline};

    #[test]
    fn test_urls() {
        assert_eq!(timeline_list_url("http://localhost:3000/"), "http://localhost:3000/timeline");
        assert_eq!(
            timeline_detail_url("http://localhost:3000", "a b&c"),
            "http://localhost:3000/timeline/detail?timelineId=a%20b%26c"
        );
    }

    #[test]
    fn test_decode_success() {
        let body = r#"{"success":true,"data":[{"id":"t1","deviceId":"d1","startTime":"2024-05-01T08:00:00Z","endTime":"2024-05-01T09:00:00Z","Device":{"name":"Truck"}}]}"#;
        let timelines: Vec<Timeline> = decode_response(body).unwrap();
        assert_eq!(timelines.len(), 1);
        assert!(!timelines[0].is_ongoing());
    }

    #[test]
    fn test_decode_failures() {
        let unsuccessful = decode_response::<Vec<LocationEvent>>(r#"{"success":false,"message":"nope"}"#);
        assert_eq!(unsuccessful.unwrap_err().user_message(), "Failed to fetch data");

        let garbage = decode_response::<Vec<LocationEvent>>("<html>");
        assert!(matches!(garbage, Err(ApiError::Decode(_))));
        assert_eq!(garbage.unwrap_err().user_message(), "Error fetching data");
    }
}
