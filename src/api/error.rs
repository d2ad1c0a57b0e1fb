//! REST Error Types
//!
//! Failures of the history endpoints and the message each one shows.

use thiserror::Error;

/// Shown when the server answers with `success: false`
pub const FAILED_TO_FETCH: &str = "Failed to fetch data";

/// Shown when the request itself failed or the body was unreadable
pub const ERROR_FETCHING: &str = "Error fetching data";

/// REST client errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Server not reachable
    #[error("API unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(String),

    /// Non-2xx response
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx response carrying `success: false`
    #[error("Server reported failure")]
    Unsuccessful,

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message for the page-level alert
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Unsuccessful => FAILED_TO_FETCH,
            _ => ERROR_FETCHING,
        }
    }
}

#[cfg(feature = "native")]
impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::Unavailable
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(ApiError::Unsuccessful.user_message(), "Failed to fetch data");
        assert_eq!(ApiError::Timeout.user_message(), "Error fetching data");
        assert_eq!(
            ApiError::Decode("eof".into()).user_message(),
            "Error fetching data"
        );
        assert_eq!(
            ApiError::Status {
                status: 500,
                message: "boom".into()
            }
            .to_string(),
            "API error 500: boom"
        );
    }
}
