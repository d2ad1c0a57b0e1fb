//! Realtime detail page of one timeline.

use super::live::LiveView;
use crate::protocol::{ClientCommand, EventKind, Feed};
use crate::store::TimelineFeed;
use crate::transport::{ConnectionStatus, SocketService};

/// Mounted realtime timeline detail
///
/// Dropping it sends `unsubscribe { type: "timelineDetailRealtime",
/// timelineId }` when the socket is open.
#[derive(Debug)]
pub struct TimelineLiveView {
    timeline_id: String,
    view: LiveView<TimelineFeed>,
}

impl TimelineLiveView {
    pub fn mount(socket: &SocketService, timeline_id: impl Into<String>) -> Self {
        let timeline_id = timeline_id.into();
        let mut view = LiveView::new(socket, TimelineFeed::new(timeline_id.clone()));
        for kind in [EventKind::TimelineDetailRealtime, EventKind::DetailActivity] {
            view.bind(kind, |feed: &mut TimelineFeed, event| feed.apply(event));
        }

        let id = timeline_id.clone();
        view.bind_status(move |socket| {
            socket.subscribe(Feed::TimelineDetailRealtime, Some(id.clone()));
        });
        view.set_farewell(ClientCommand::Unsubscribe {
            feed: Feed::TimelineDetailRealtime,
            timeline_id: Some(timeline_id.clone()),
        });

        if socket.is_connected() {
            socket.subscribe(Feed::TimelineDetailRealtime, Some(timeline_id.clone()));
        } else {
            socket.connect();
        }
        Self { timeline_id, view }
    }

    pub fn timeline_id(&self) -> &str {
        &self.timeline_id
    }

    pub fn snapshot(&self) -> TimelineFeed {
        self.view.snapshot()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.view.status()
    }

    pub fn changes(&self) -> tokio::sync::watch::Receiver<u64> {
        self.view.changes()
    }

    pub fn retry(&self) {
        self.view.update(TimelineFeed::retry);
        self.view
            .socket()
            .subscribe(Feed::TimelineDetailRealtime, Some(self.timeline_id.clone()));
    }
}
