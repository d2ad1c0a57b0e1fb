//! Live View Plumbing
//!
//! A mounted page: its state, the listeners feeding it and a revision
//! counter that ticks on every change. Listeners only hold a `Weak` to the
//! state, and the subscriptions are released before anything else when the
//! view drops, so nothing touches the state after unmount.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::protocol::{ClientCommand, EventKind, ServerEvent};
use crate::transport::{lock, ConnectionStatus, SocketService, Subscription};

pub(crate) struct Shared<S> {
    state: Mutex<S>,
    status: Mutex<ConnectionStatus>,
    revision: watch::Sender<u64>,
}

impl<S> Shared<S> {
    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}

/// A mounted live page over state `S`
pub struct LiveView<S> {
    subscriptions: Vec<Subscription>,
    shared: Arc<Shared<S>>,
    socket: SocketService,
    /// Sent on unmount while the socket is open
    farewell: Option<ClientCommand>,
}

impl<S: Send + 'static> LiveView<S> {
    pub(crate) fn new(socket: &SocketService, state: S) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            subscriptions: Vec::new(),
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                status: Mutex::new(socket.status()),
                revision,
            }),
            socket: socket.clone(),
            farewell: None,
        }
    }

    /// Feed events of `kind` into the state
    ///
    /// `apply` returns whether the state changed.
    pub(crate) fn bind<F>(&mut self, kind: EventKind, apply: F)
    where
        F: Fn(&mut S, &ServerEvent) -> bool + Send + Sync + 'static,
    {
        let weak = Arc::downgrade(&self.shared);
        let sub = self.socket.on(kind, move |event| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let changed = apply(&mut lock(&shared.state), event);
            if changed {
                shared.bump();
            }
        });
        self.subscriptions.push(sub);
    }

    /// Track connection status; `on_open` runs every time the socket opens
    pub(crate) fn bind_status<F>(&mut self, on_open: F)
    where
        F: Fn(&SocketService) + Send + Sync + 'static,
    {
        let weak = Arc::downgrade(&self.shared);
        let socket = self.socket.clone();
        let sub = self.socket.on_status(move |status| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            *lock(&shared.status) = status;
            shared.bump();
            if status.is_connected() {
                on_open(&socket);
            }
        });
        self.subscriptions.push(sub);
    }

    pub(crate) fn set_farewell(&mut self, command: ClientCommand) {
        self.farewell = Some(command);
    }

    /// Run `f` against the current state
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&lock(&self.shared.state))
    }

    /// Mutate the state locally (e.g. retry) and notify watchers
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = f(&mut lock(&self.shared.state));
        self.shared.bump();
        result
    }

    pub fn status(&self) -> ConnectionStatus {
        *lock(&self.shared.status)
    }

    /// Receiver that changes whenever the state or status changes
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    pub fn socket(&self) -> &SocketService {
        &self.socket
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl<S: Clone + Send + 'static> LiveView<S> {
    pub fn snapshot(&self) -> S {
        self.with(S::clone)
    }
}

impl<S> Drop for LiveView<S> {
    fn drop(&mut self) {
        self.subscriptions.clear();
        if let Some(command) = self.farewell.take() {
            if self.socket.is_connected() {
                self.socket.send(&command);
            }
        }
    }
}

impl<S> std::fmt::Debug for LiveView<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveView")
            .field("listeners", &self.subscriptions.len())
            .field("revision", &*self.shared.revision.borrow())
            .finish()
    }
}
