//! History REST API
//!
//! Recorded timelines are served over plain HTTP:
//!
//! - `GET /timeline` → `{ success, data: Timeline[] }`
//! - `GET /timeline/detail?timelineId=` → `{ success, data: Location[] }`
//!
//! Envelope decoding and URL building are shared with the browser UI; the
//! reqwest client is native only.

#[cfg(feature = "native")]
mod client;
mod error;
mod response;

#[cfg(feature = "native")]
pub use client::TimelineClient;
pub use error::{ApiError, ERROR_FETCHING, FAILED_TO_FETCH};
pub use response::{
    decode_response, timeline_detail_url, timeline_list_url, ApiResponse, TIMELINE_DETAIL_PATH,
    TIMELINE_PATH,
};
