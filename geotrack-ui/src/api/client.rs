//! HTTP API Client
//!
//! Timeline history from the REST API. Envelope decoding and URLs come
//! from the shared core, so the browser and terminal clients agree.

use geotrack::api::{decode_response, timeline_detail_url, timeline_list_url, ApiError};
use geotrack::model::{LocationEvent, Timeline};
use geotrack::store::ViewState;
use gloo_net::http::Request;

/// Default REST API base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:3000";

/// Default WebSocket server URL
pub const DEFAULT_WS_BASE: &str = "http://localhost:3001";

fn stored_url(key: &str, default: &str) -> String {
    let url = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(key).ok().flatten())
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    url.trim_end_matches('/').to_string()
}

/// API base URL from local storage, or the default
pub fn get_api_base() -> String {
    stored_url("geotrack_api_url", DEFAULT_API_BASE)
}

/// WebSocket URL from local storage, or the default
pub fn get_ws_base() -> String {
    stored_url("geotrack_ws_url", DEFAULT_WS_BASE)
}

async fn get(url: &str) -> Result<String, ApiError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;

    if !response.ok() {
        return Err(ApiError::Status {
            status: response.status(),
            message: response.status_text(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Fetch all recorded timelines
pub async fn fetch_timelines(api_base: &str) -> Result<Vec<Timeline>, ApiError> {
    let body = get(&timeline_list_url(api_base)).await?;
    decode_response(&body)
}

/// Fetch the recorded locations of one timeline
pub async fn fetch_timeline_detail(
    api_base: &str,
    timeline_id: &str,
) -> Result<Vec<LocationEvent>, ApiError> {
    let body = get(&timeline_detail_url(api_base, timeline_id)).await?;
    decode_response(&body)
}

/// Turn a fetch result into a page state, logging failures
pub fn into_view_state<T>(result: Result<T, ApiError>) -> ViewState<T> {
    let mut state = ViewState::Loading;
    match result {
        Ok(value) => {
            state.load(value);
        }
        Err(e) => {
            web_sys::console::error_1(&format!("Error fetching data: {}", e).into());
            state.fail(e.user_message());
        }
    }
    state
}
