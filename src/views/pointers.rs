//! Multi-pointer page: every tracked device, live.

use rand::Rng;

use super::live::LiveView;
use crate::model::LatLng;
use crate::protocol::EventKind;
use crate::render::jitter;
use crate::store::PointerStore;
use crate::transport::{ConnectionStatus, SocketService};

/// Mounted multi-pointer page
#[derive(Debug)]
pub struct MultiPointerView {
    view: LiveView<PointerStore>,
}

impl MultiPointerView {
    /// Attach to the socket, connecting it if needed
    ///
    /// `getPointers` is sent on every open, so a reconnect refreshes the set.
    pub fn mount(socket: &SocketService) -> Self {
        let mut view = LiveView::new(socket, PointerStore::new());
        for kind in [
            EventKind::Pointers,
            EventKind::PointerAdded,
            EventKind::PointerRemoved,
            EventKind::PointerMoved,
        ] {
            view.bind(kind, |store: &mut PointerStore, event| store.apply(event));
        }
        view.bind(EventKind::Connected, |_, event| {
            tracing::info!(event = ?event, "Server greeting");
            false
        });
        view.bind_status(|socket| {
            socket.get_pointers();
        });

        if socket.is_connected() {
            socket.get_pointers();
        } else {
            socket.connect();
        }
        Self { view }
    }

    pub fn snapshot(&self) -> PointerStore {
        self.view.snapshot()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.view.status()
    }

    pub fn changes(&self) -> tokio::sync::watch::Receiver<u64> {
        self.view.changes()
    }

    /// Manual reconnect after the connection dropped
    pub fn reconnect(&self) {
        self.view.socket().connect();
    }

    /// Create a pointer at a position (map click)
    pub fn add(&self, position: LatLng) -> bool {
        self.view.socket().add_pointer(position)
    }

    pub fn remove(&self, id: &str) -> bool {
        self.view.socket().remove_pointer(id)
    }

    /// Move a pointer by a small random offset
    ///
    /// Returns `false` for unknown ids or when the socket is closed.
    pub fn nudge(&self, id: &str) -> bool {
        let Some(position) = self.view.with(|store| store.get(id).map(|p| p.position())) else {
            return false;
        };
        let mut rng = rand::thread_rng();
        let target = jitter(position, rng.gen::<f64>(), rng.gen::<f64>());
        self.view.socket().move_pointer(id, target)
    }
}
