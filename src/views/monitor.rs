//! Realtime monitor page: active timelines with live samples.

use super::live::LiveView;
use crate::protocol::{EventKind, Feed};
use crate::store::MonitorBoard;
use crate::transport::{ConnectionStatus, SocketService};

/// Mounted realtime monitor
#[derive(Debug)]
pub struct RealtimeMonitorView {
    view: LiveView<MonitorBoard>,
}

impl RealtimeMonitorView {
    /// Attach and subscribe to the monitor feed (again on every reopen)
    pub fn mount(socket: &SocketService) -> Self {
        let mut view = LiveView::new(socket, MonitorBoard::new());
        for kind in [
            EventKind::RealtimeMonitor,
            EventKind::ActiveTimeline,
            EventKind::LocationUpdate,
        ] {
            view.bind(kind, |board: &mut MonitorBoard, event| board.apply(event));
        }
        view.bind_status(|socket| {
            socket.subscribe(Feed::RealtimeMonitor, None);
        });

        if socket.is_connected() {
            socket.subscribe(Feed::RealtimeMonitor, None);
        } else {
            socket.connect();
        }
        Self { view }
    }

    pub fn snapshot(&self) -> MonitorBoard {
        self.view.snapshot()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.view.status()
    }

    pub fn changes(&self) -> tokio::sync::watch::Receiver<u64> {
        self.view.changes()
    }

    /// Clear an error and ask again
    pub fn retry(&self) {
        self.view.update(MonitorBoard::retry);
        self.view.socket().subscribe(Feed::RealtimeMonitor, None);
    }
}
