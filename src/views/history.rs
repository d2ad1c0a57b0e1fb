//! History pages: one-shot REST loads into a view state.

use crate::api::TimelineClient;
use crate::model::{LocationEvent, Timeline};
use crate::render::MapOverlay;
use crate::store::ViewState;

/// Load the timeline list
pub async fn load_history(client: &TimelineClient) -> ViewState<Vec<Timeline>> {
    let mut state = ViewState::Loading;
    match client.list_timelines().await {
        Ok(timelines) => {
            state.load(timelines);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load timelines");
            state.fail(e.user_message());
        }
    }
    state
}

/// Tabs of the history detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTab {
    #[default]
    Table,
    Map,
}

/// Recorded locations of one timeline
#[derive(Debug, Clone)]
pub struct HistoryDetail {
    pub timeline_id: String,
    pub state: ViewState<Vec<LocationEvent>>,
    pub tab: DetailTab,
}

impl HistoryDetail {
    pub async fn load(client: &TimelineClient, timeline_id: &str) -> Self {
        let mut state = ViewState::Loading;
        match client.timeline_detail(timeline_id).await {
            Ok(locations) => {
                state.load(locations);
            }
            Err(e) => {
                tracing::error!(timeline_id = %timeline_id, error = %e, "Failed to load timeline detail");
                state.fail(e.user_message());
            }
        }
        Self {
            timeline_id: timeline_id.to_string(),
            state,
            tab: DetailTab::Table,
        }
    }

    /// Map tab overlay; empty while loading or failed
    pub fn overlay(&self) -> MapOverlay {
        MapOverlay::from_locations(self.state.data().map(Vec::as_slice).unwrap_or(&[]))
    }
}
