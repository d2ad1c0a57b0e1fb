//! Native Socket Driver
//!
//! Runs [`TransportCore`] against a real WebSocket with tokio. One task per
//! connection reads and writes through `tokio::select!`; reconnects and
//! move flushes are short sleeping tasks that report back to the core.
//!
//! All methods must be called from inside a tokio runtime.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::reconnect::ReconnectTicket;
use super::registry::{ConnectionStatus, ListenerRegistry, Subscription};
use super::state::{ConnectAttempt, Inbound, TransportCore};
use super::{lock, websocket_url, CLOSE_REASON};
use crate::config::TransportConfig;
use crate::model::LatLng;
use crate::protocol::{ClientCommand, EventKind, Feed, ServerEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection-level failures
///
/// Never returned to callers: they are logged and turned into a reconnect.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection closed by server")]
    Closed,
}

/// Frames queued for the connection task
#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

struct Writer {
    attempt: ConnectAttempt,
    tx: mpsc::UnboundedSender<Outbound>,
    /// Resolves once the connection task has written its last frame
    done: oneshot::Receiver<()>,
}

struct Shared {
    core: TransportCore,
    writer: Option<Writer>,
    /// Last status queued for status listeners
    reported: ConnectionStatus,
    /// Status changes not yet delivered, oldest first
    pending: VecDeque<ConnectionStatus>,
    /// Set while some thread is delivering `pending`
    emitting: bool,
}

struct Inner {
    url: String,
    config: TransportConfig,
    shared: Mutex<Shared>,
    listeners: ListenerRegistry,
}

/// Shared handle to the tracking server's WebSocket
///
/// Cheap to clone; every clone drives the same connection.
#[derive(Clone)]
pub struct SocketService {
    inner: Arc<Inner>,
}

impl SocketService {
    /// Create a service for `url` (`http(s)` is rewritten to `ws(s)`)
    ///
    /// Nothing is opened until [`connect`](Self::connect).
    pub fn new(url: impl AsRef<str>, config: TransportConfig) -> Self {
        let core = TransportCore::new(config.reconnect_delay());
        Self {
            inner: Arc::new(Inner {
                url: websocket_url(url.as_ref()),
                config,
                shared: Mutex::new(Shared {
                    core,
                    writer: None,
                    reported: ConnectionStatus::Idle,
                    pending: VecDeque::new(),
                    emitting: false,
                }),
                listeners: ListenerRegistry::new(),
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn status(&self) -> ConnectionStatus {
        lock(&self.inner.shared).core.status()
    }

    pub fn is_connected(&self) -> bool {
        self.status().is_connected()
    }

    /// Connection attempts started so far, reconnects included
    pub fn attempts(&self) -> u64 {
        lock(&self.inner.shared).core.attempts()
    }

    pub fn is_reconnect_pending(&self) -> bool {
        lock(&self.inner.shared).core.is_reconnect_pending()
    }

    /// Open the connection if none is open or connecting
    pub fn connect(&self) {
        Inner::connect(&self.inner);
    }

    /// Close deliberately; no reconnect follows
    ///
    /// Frames already queued (an unsubscribe from a dropped view, say) are
    /// still written before the close frame, but this returns at once. Use
    /// [`close`](Self::close) when the runtime is about to shut down.
    pub fn disconnect(&self) {
        if let Some(writer) = self.take_writer() {
            let _ = writer.tx.send(Outbound::Close);
        }
    }

    /// Close deliberately and wait until the close frame has been written
    ///
    /// Gives up after the connect timeout if the server stops reading.
    pub async fn close(&self) {
        let Some(writer) = self.take_writer() else {
            return;
        };
        if writer.tx.send(Outbound::Close).is_err() {
            return;
        }

        let timeout = self.inner.config.connect_timeout();
        if tokio::time::timeout(timeout, writer.done).await.is_err() {
            tracing::warn!(url = %self.inner.url, "Timed out waiting for the WebSocket to close");
        }
    }

    fn take_writer(&self) -> Option<Writer> {
        let writer = self.inner.update(|shared| {
            shared.core.disconnect();
            shared.writer.take()
        });
        match &writer {
            Some(_) => tracing::info!(url = %self.inner.url, "Disconnecting WebSocket"),
            None => tracing::debug!("Disconnect requested with no open socket"),
        }
        writer
    }

    /// Send a command
    ///
    /// Returns `false` (and logs) when the socket is not open. Nothing is
    /// queued for later.
    pub fn send(&self, command: &ClientCommand) -> bool {
        let text = match command.encode() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(event = command.event_name(), error = %e, "Failed to encode command");
                return false;
            }
        };

        let shared = lock(&self.inner.shared);
        let writer = match (&shared.writer, shared.core.can_send()) {
            (Some(writer), true) => writer,
            _ => {
                tracing::warn!(
                    event = command.event_name(),
                    "WebSocket is not connected, message not sent"
                );
                return false;
            }
        };

        if writer.tx.send(Outbound::Text(text)).is_err() {
            tracing::warn!(event = command.event_name(), "Connection task gone, message not sent");
            return false;
        }
        tracing::debug!(event = command.event_name(), "Sent command");
        true
    }

    pub fn get_pointers(&self) -> bool {
        self.send(&ClientCommand::GetPointers)
    }

    pub fn add_pointer(&self, position: LatLng) -> bool {
        self.send(&ClientCommand::AddPointer {
            latitude: position.latitude,
            longitude: position.longitude,
        })
    }

    pub fn remove_pointer(&self, id: impl Into<String>) -> bool {
        self.send(&ClientCommand::RemovePointer { id: id.into() })
    }

    pub fn move_pointer(&self, id: impl Into<String>, position: LatLng) -> bool {
        self.send(&ClientCommand::MovePointer {
            id: id.into(),
            latitude: position.latitude,
            longitude: position.longitude,
        })
    }

    pub fn subscribe(&self, feed: Feed, timeline_id: Option<String>) -> bool {
        self.send(&ClientCommand::subscribe(feed, timeline_id))
    }

    pub fn unsubscribe(&self, feed: Feed, timeline_id: Option<String>) -> bool {
        self.send(&ClientCommand::Unsubscribe { feed, timeline_id })
    }

    /// Listen for one event kind
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn on<F>(&self, kind: EventKind, listener: F) -> Subscription
    where
        F: Fn(&ServerEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.on(kind, listener)
    }

    /// Listen for connection status changes
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn on_status<F>(&self, listener: F) -> Subscription
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static,
    {
        self.inner.listeners.on_status(listener)
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.inner.listeners
    }
}

impl std::fmt::Debug for SocketService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketService")
            .field("url", &self.inner.url)
            .field("status", &self.status())
            .finish()
    }
}

impl Inner {
    /// Run `f` on the shared state, then report a status change (if any)
    /// with the lock released
    ///
    /// Changes are queued under the lock and delivered by one thread at a
    /// time, so listeners see them in the order they happened. A listener
    /// that calls back into the service only queues; the thread already
    /// delivering picks the new status up.
    fn update<R>(&self, f: impl FnOnce(&mut Shared) -> R) -> R {
        let (result, deliver) = {
            let mut shared = lock(&self.shared);
            let result = f(&mut shared);
            let status = shared.core.status();
            if status != shared.reported {
                shared.reported = status;
                shared.pending.push_back(status);
            }
            let deliver = !shared.emitting && !shared.pending.is_empty();
            if deliver {
                shared.emitting = true;
            }
            (result, deliver)
        };

        if deliver {
            self.deliver_statuses();
        }
        result
    }

    fn deliver_statuses(&self) {
        loop {
            let next = {
                let mut shared = lock(&self.shared);
                let next = shared.pending.pop_front();
                if next.is_none() {
                    shared.emitting = false;
                }
                next
            };
            let Some(status) = next else {
                return;
            };
            tracing::debug!(status = %status, "Connection status changed");
            self.listeners.emit_status(status);
        }
    }

    fn connect(this: &Arc<Self>) {
        if let Some(attempt) = this.update(|shared| shared.core.connect()) {
            Self::start(this, attempt);
        }
    }

    fn start(this: &Arc<Self>, attempt: ConnectAttempt) {
        let inner = Arc::clone(this);
        spawn(async move {
            tracing::info!(url = %inner.url, attempt = attempt.0, "Connecting to WebSocket");

            let stream = match inner.open().await {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::error!(url = %inner.url, error = %e, "WebSocket connection failed");
                    let ticket = inner.update(|shared| shared.core.connect_failed(attempt));
                    Self::schedule_reconnect(&inner, ticket);
                    return;
                }
            };

            let (tx, rx) = mpsc::unbounded_channel();
            let (done_tx, done) = oneshot::channel();
            let opened = inner.update(|shared| {
                let opened = shared.core.opened(attempt);
                if opened {
                    shared.writer = Some(Writer { attempt, tx, done });
                }
                opened
            });

            if !opened {
                tracing::debug!(attempt = attempt.0, "Connection no longer wanted, closing");
                let mut stream = stream;
                let _ = stream.close(Some(normal_close())).await;
                return;
            }

            tracing::info!(url = %inner.url, "WebSocket connected");
            let result = Self::run(&inner, attempt, stream, rx).await;
            let _ = done_tx.send(());

            let ticket = inner.update(|shared| {
                if shared.writer.as_ref().map(|w| w.attempt) == Some(attempt) {
                    shared.writer = None;
                }
                match &result {
                    Ok(()) => shared.core.closed(attempt),
                    Err(TransportError::Closed) => shared.core.closed(attempt),
                    Err(_) => shared.core.errored(attempt),
                }
            });

            match result {
                Ok(()) => tracing::info!("WebSocket disconnected"),
                Err(e) => tracing::warn!(error = %e, "WebSocket connection lost"),
            }
            Self::schedule_reconnect(&inner, ticket);
        });
    }

    async fn open(&self) -> Result<WsStream, TransportError> {
        let timeout = self.config.connect_timeout();
        match tokio::time::timeout(timeout, tokio_tungstenite::connect_async(self.url.as_str()))
            .await
        {
            Ok(Ok((stream, _response))) => Ok(stream),
            Ok(Err(e)) => Err(TransportError::Connect(e)),
            Err(_) => Err(TransportError::Timeout(timeout)),
        }
    }

    /// Pump one connection until it closes
    ///
    /// `Ok(())` means a deliberate close from this side.
    async fn run(
        this: &Arc<Self>,
        attempt: ConnectAttempt,
        stream: WsStream,
        mut rx: mpsc::UnboundedReceiver<Outbound>,
    ) -> Result<(), TransportError> {
        let (mut write, mut read) = stream.split();

        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => Self::receive(this, attempt, text.as_str()),
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!(frame = ?frame, "Server closed the connection");
                        return Err(TransportError::Closed);
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::debug!("Ignoring binary frame");
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(TransportError::Connect(e)),
                    None => return Err(TransportError::Closed),
                },
                outbound = rx.recv() => match outbound {
                    Some(Outbound::Text(text)) => {
                        write.send(Message::text(text)).await?;
                    }
                    Some(Outbound::Close) | None => {
                        let _ = write.send(Message::Close(Some(normal_close()))).await;
                        return Ok(());
                    }
                },
            }
        }
    }

    fn receive(this: &Arc<Self>, attempt: ConnectAttempt, text: &str) {
        let inbound = lock(&this.shared).core.receive(attempt, text);
        match inbound {
            Inbound::Dispatch(event) => {
                this.listeners.emit(&event);
            }
            Inbound::Coalesced {
                schedule_flush: true,
            } => Self::schedule_flush(this),
            Inbound::Coalesced { .. } | Inbound::Dropped(_) | Inbound::Stale => {}
        }
    }

    fn schedule_flush(this: &Arc<Self>) {
        let inner = Arc::clone(this);
        let interval = this.config.flush_interval();
        spawn(async move {
            tokio::time::sleep(interval).await;
            let events = lock(&inner.shared).core.flush();
            for event in &events {
                inner.listeners.emit(event);
            }
        });
    }

    fn schedule_reconnect(this: &Arc<Self>, ticket: Option<ReconnectTicket>) {
        let Some(ticket) = ticket else {
            return;
        };
        let inner = Arc::clone(this);
        spawn(async move {
            tokio::time::sleep(ticket.delay).await;
            if let Some(attempt) = inner.update(|shared| shared.core.reconnect_due(ticket)) {
                Self::start(&inner, attempt);
            }
        });
    }
}

fn normal_close() -> CloseFrame {
    CloseFrame {
        code: CloseCode::Normal,
        reason: CLOSE_REASON.into(),
    }
}

fn spawn<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(future);
        }
        Err(e) => tracing::error!(error = %e, "No tokio runtime available for socket task"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rewrites_url_and_starts_idle() {
        let socket = SocketService::new("http://localhost:3001", TransportConfig::default());
        assert_eq!(socket.url(), "ws://localhost:3001");
        assert_eq!(socket.status(), ConnectionStatus::Idle);
        assert_eq!(socket.attempts(), 0);
    }

    #[test]
    fn test_send_while_closed_returns_false() {
        let socket = SocketService::new("ws://localhost:1", TransportConfig::default());
        assert!(!socket.get_pointers());
        assert!(!socket.remove_pointer("a"));
    }

    #[tokio::test]
    async fn test_status_changed_inside_listener_arrives_in_order() {
        let config = TransportConfig {
            reconnect_delay_ms: 60_000,
            ..TransportConfig::default()
        };
        let socket = SocketService::new("ws://127.0.0.1:9", config);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let record = Arc::clone(&seen);
        let handle = socket.clone();
        let _sub = socket.on_status(move |status| {
            if status == ConnectionStatus::Connecting {
                handle.disconnect();
            }
            record.lock().unwrap().push(status);
        });

        socket.connect();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![ConnectionStatus::Connecting, ConnectionStatus::Idle]
        );
        assert_eq!(socket.status(), ConnectionStatus::Idle);
    }

    #[tokio::test]
    async fn test_close_without_socket_returns_immediately() {
        let socket = SocketService::new("ws://127.0.0.1:9", TransportConfig::default());
        socket.close().await;
        assert_eq!(socket.status(), ConnectionStatus::Idle);
    }

    #[tokio::test]
    async fn test_refused_connect_schedules_single_reconnect() {
        let config = TransportConfig {
            reconnect_delay_ms: 60_000,
            ..TransportConfig::default()
        };
        // Port 9 (discard) is closed on test machines
        let socket = SocketService::new("ws://127.0.0.1:9", config);
        socket.connect();
        socket.connect();
        assert_eq!(socket.attempts(), 1);

        for _ in 0..100 {
            if socket.is_reconnect_pending() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(socket.is_reconnect_pending());
        assert_eq!(socket.status(), ConnectionStatus::Disconnected);

        socket.disconnect();
        assert!(!socket.is_reconnect_pending());
        assert_eq!(socket.status(), ConnectionStatus::Idle);
    }
}
