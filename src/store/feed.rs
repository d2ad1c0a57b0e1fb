//! Live detail of a single timeline.

use super::ViewState;
use crate::model::TimelineDetail;
use crate::protocol::{DetailPayload, ServerEvent};

/// State behind the realtime timeline detail page
#[derive(Debug, Clone)]
pub struct TimelineFeed {
    timeline_id: String,
    state: ViewState<TimelineDetail>,
}

impl TimelineFeed {
    pub fn new(timeline_id: impl Into<String>) -> Self {
        Self {
            timeline_id: timeline_id.into(),
            state: ViewState::Loading,
        }
    }

    pub fn timeline_id(&self) -> &str {
        &self.timeline_id
    }

    pub fn state(&self) -> &ViewState<TimelineDetail> {
        &self.state
    }

    pub fn detail(&self) -> Option<&TimelineDetail> {
        self.state.data()
    }

    /// Apply a detail payload; a server `{ error }` fails the view
    pub fn apply_payload(&mut self, payload: &DetailPayload) -> bool {
        match payload {
            DetailPayload::Failed { error } => {
                tracing::warn!(timeline_id = %self.timeline_id, error = %error, "Timeline detail failed");
                self.state.fail(error.clone());
                true
            }
            DetailPayload::Detail(detail) => self.state.load(detail.clone()),
        }
    }

    /// Apply one inbound event; returns whether the view changed
    pub fn apply(&mut self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::TimelineDetailRealtime(payload) | ServerEvent::DetailActivity(payload) => {
                self.apply_payload(payload)
            }
            _ => false,
        }
    }

    pub fn retry(&mut self) {
        self.state.retry();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_loads() {
        let mut feed = TimelineFeed::new("t1");
        let event = ServerEvent::decode(
            r#"{"event":"timelineDetailRealtime","payload":{"device":{"name":"Truck"},"locations":[{"id":1,"latitude":-6.2,"longitude":106.8,"eventType":"start"}]}}"#,
        )
        .unwrap();

        assert!(feed.apply(&event));
        let detail = feed.detail().unwrap();
        assert_eq!(detail.device.name, "Truck");
        assert_eq!(detail.locations.len(), 1);
    }

    #[test]
    fn test_error_payload_fails_and_sticks() {
        let mut feed = TimelineFeed::new("t404");
        let failed =
            ServerEvent::decode(r#"{"event":"timelineDetailRealtime","payload":{"error":"Timeline not found"}}"#)
                .unwrap();
        feed.apply(&failed);
        assert_eq!(feed.state().error(), Some("Timeline not found"));

        let detail = ServerEvent::DetailActivity(DetailPayload::Detail(TimelineDetail::default()));
        assert!(!feed.apply(&detail));
        assert!(feed.detail().is_none());

        feed.retry();
        assert!(feed.apply(&detail));
    }
}
