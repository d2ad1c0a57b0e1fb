//! Realtime monitor board: active timelines plus their live samples.

use super::ViewState;
use crate::model::{LocationUpdate, MonitoredTimeline};
use crate::protocol::ServerEvent;

/// Shown when the server reports no active timelines
pub const NO_ACTIVE_TIMELINES: &str = "No active timelines.";

/// State behind the realtime monitor page
#[derive(Debug, Clone, Default)]
pub struct MonitorBoard {
    state: ViewState<Vec<MonitoredTimeline>>,
}

impl MonitorBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState<Vec<MonitoredTimeline>> {
        &self.state
    }

    pub fn timelines(&self) -> &[MonitoredTimeline] {
        self.state.data().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Informational message for an empty board
    pub fn notice(&self) -> Option<&'static str> {
        match self.state.data() {
            Some(list) if list.is_empty() => Some(NO_ACTIVE_TIMELINES),
            _ => None,
        }
    }

    /// Replace the active set (`realtimeMonitor` / `activeTimeline`)
    pub fn replace(&mut self, timelines: Vec<MonitoredTimeline>) -> bool {
        self.state.load(timelines)
    }

    /// Append a live sample to the timeline of the same device
    ///
    /// Updates for devices without an active timeline are ignored.
    pub fn push_location(&mut self, update: &LocationUpdate) -> bool {
        let mut matched = false;
        self.state.update(|list| {
            if let Some(timeline) = list
                .iter_mut()
                .find(|t| t.timeline.device_id == update.device_id)
            {
                timeline.locations.push(update.clone().into_sample());
                matched = true;
            }
        });
        if !matched {
            tracing::trace!(device_id = %update.device_id, "Location update for inactive device");
        }
        matched
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.state.fail(message);
    }

    pub fn retry(&mut self) {
        self.state.retry();
    }

    /// Apply one inbound event; returns whether the board changed
    pub fn apply(&mut self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::RealtimeMonitor(list) | ServerEvent::ActiveTimeline(list) => {
                self.replace(list.clone())
            }
            ServerEvent::LocationUpdate(update) => self.push_location(update),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITOR: &str = r#"{"event":"realtimeMonitor","data":[
        {"id":"t1","deviceId":"d1","startTime":"2024-05-01T08:00:00Z","endTime":null,"Device":{"id":"d1","name":"Truck","os":"Android"}},
        {"id":"t2","deviceId":"d2","startTime":"2024-05-01T09:00:00Z","endTime":null,"Device":{"id":"d2","name":"Van","os":"iOS"}}
    ]}"#;

    fn update(device: &str) -> LocationUpdate {
        LocationUpdate {
            device_id: device.to_string(),
            latitude: -6.2,
            longitude: 106.8,
            reverse_data: None,
        }
    }

    #[test]
    fn test_location_update_appends_to_matching_device() {
        let mut board = MonitorBoard::new();
        assert!(board.apply(&ServerEvent::decode(MONITOR).unwrap()));
        assert_eq!(board.timelines().len(), 2);

        assert!(board.push_location(&update("d2")));
        assert!(board.push_location(&update("d2")));
        assert_eq!(board.timelines()[1].locations.len(), 2);
        assert!(board.timelines()[0].locations.is_empty());

        assert!(!board.push_location(&update("unknown")));
    }

    #[test]
    fn test_empty_list_shows_notice() {
        let mut board = MonitorBoard::new();
        assert!(board.notice().is_none());
        board.apply(&ServerEvent::decode(r#"{"event":"realtimeMonitor","payload":[]}"#).unwrap());
        assert_eq!(board.notice(), Some(NO_ACTIVE_TIMELINES));
        assert!(!board.state().is_loading());
    }

    #[test]
    fn test_active_timeline_same_as_monitor() {
        let mut board = MonitorBoard::new();
        let text = MONITOR.replace("realtimeMonitor", "activeTimeline");
        assert!(board.apply(&ServerEvent::decode(&text).unwrap()));
        assert_eq!(board.timelines()[0].timeline.device_name(), "Truck");
    }

    #[test]
    fn test_update_before_load_ignored() {
        let mut board = MonitorBoard::new();
        assert!(!board.push_location(&update("d1")));
        assert!(board.state().is_loading());
    }
}
