//! WebSocket Client
//!
//! Browser driver of the shared transport. `TransportCore` decides what
//! happens; this module only wires it to `web_sys::WebSocket`, a
//! `gloo-timers` reconnect timeout and `requestAnimationFrame` flushes.
//!
//! Every socket callback carries the attempt it was created for, so
//! callbacks of a replaced socket are ignored by the core.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use geotrack::protocol::{ClientCommand, EventKind, Feed, ServerEvent};
use geotrack::transport::{
    websocket_url, ConnectAttempt, ConnectionStatus, Inbound, ListenerRegistry, ReconnectTicket,
    Subscription, TransportCore, CLOSE_REASON, DEFAULT_RECONNECT_DELAY, NORMAL_CLOSE_CODE,
};
use geotrack::LatLng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

struct Inner {
    url: String,
    core: RefCell<TransportCore>,
    socket: RefCell<Option<(ConnectAttempt, WebSocket)>>,
    reported: Cell<ConnectionStatus>,
    listeners: ListenerRegistry,
}

/// Shared WebSocket connection of the dashboard
///
/// Cloning is cheap; all clones drive the same socket.
#[derive(Clone)]
pub struct WebSocketClient {
    inner: Rc<Inner>,
}

impl WebSocketClient {
    /// Create an idle client for an `http(s)` or `ws(s)` URL
    pub fn new(url: &str) -> Self {
        Self {
            inner: Rc::new(Inner {
                url: websocket_url(url),
                core: RefCell::new(TransportCore::new(DEFAULT_RECONNECT_DELAY)),
                socket: RefCell::new(None),
                reported: Cell::new(ConnectionStatus::Idle),
                listeners: ListenerRegistry::new(),
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.core.borrow().status()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.core.borrow().can_send()
    }

    /// Open the connection; a no-op while connecting or connected
    pub fn connect(&self) {
        let attempt = self.inner.core.borrow_mut().connect();
        if let Some(attempt) = attempt {
            open(&self.inner, attempt);
        }
    }

    /// Close deliberately; cancels any pending reconnect
    pub fn disconnect(&self) {
        let closing = self.inner.core.borrow_mut().disconnect();
        let socket = self.inner.socket.borrow_mut().take();
        if let (Some(_), Some((_, ws))) = (closing, socket) {
            if let Err(e) = ws.close_with_code_and_reason(NORMAL_CLOSE_CODE, CLOSE_REASON) {
                web_sys::console::warn_1(&format!("WebSocket close failed: {:?}", e).into());
            }
        }
        report(&self.inner);
    }

    /// Send a command if the socket is open
    ///
    /// Returns `false` (and logs) when not connected; nothing is queued.
    pub fn send(&self, command: &ClientCommand) -> bool {
        if !self.is_connected() {
            web_sys::console::warn_1(
                &format!("WebSocket not connected, dropping {}", command.event_name()).into(),
            );
            return false;
        }
        let frame = match command.encode() {
            Ok(frame) => frame,
            Err(e) => {
                web_sys::console::error_1(&format!("Failed to encode command: {}", e).into());
                return false;
            }
        };
        let socket = self.inner.socket.borrow();
        match socket.as_ref() {
            Some((_, ws)) => ws.send_with_str(&frame).is_ok(),
            None => false,
        }
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

    pub fn remove_pointer(&self, id: &str) -> bool {
        self.send(&ClientCommand::RemovePointer { id: id.to_string() })
    }

    pub fn move_pointer(&self, id: &str, position: LatLng) -> bool {
        self.send(&ClientCommand::MovePointer {
            id: id.to_string(),
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

    /// Listen for one event kind until the subscription is dropped
    pub fn on<F>(&self, kind: EventKind, listener: F) -> Subscription
    where
        F: Fn(&ServerEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.on(kind, listener)
    }

    /// Listen for status changes until the subscription is dropped
    pub fn on_status<F>(&self, listener: F) -> Subscription
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static,
    {
        self.inner.listeners.on_status(listener)
    }
}

/// Emit the current status if it changed since the last report
///
/// Never called with a `RefCell` borrow held: listeners may call back in.
fn report(inner: &Inner) {
    let status = inner.core.borrow().status();
    if inner.reported.replace(status) != status {
        inner.listeners.emit_status(status);
    }
}

fn open(inner: &Rc<Inner>, attempt: ConnectAttempt) {
    match WebSocket::new(&inner.url) {
        Ok(ws) => {
            attach(inner, attempt, &ws);
            *inner.socket.borrow_mut() = Some((attempt, ws));
            web_sys::console::log_1(&format!("Connecting to {}", inner.url).into());
        }
        Err(e) => {
            web_sys::console::error_1(&format!("WebSocket connection failed: {:?}", e).into());
            let ticket = inner.core.borrow_mut().connect_failed(attempt);
            schedule_reconnect(inner, ticket);
        }
    }
    report(inner);
}

fn attach(inner: &Rc<Inner>, attempt: ConnectAttempt, ws: &WebSocket) {
    let weak = Rc::downgrade(inner);
    let on_open = Closure::wrap(Box::new(move |_: JsValue| {
        let Some(inner) = weak.upgrade() else { return };
        if inner.core.borrow_mut().opened(attempt) {
            web_sys::console::log_1(&"WebSocket connected".into());
        }
        report(&inner);
    }) as Box<dyn FnMut(JsValue)>);
    ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
    on_open.forget();

    let weak = Rc::downgrade(inner);
    let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
        let Some(inner) = weak.upgrade() else { return };
        let Some(text) = event.data().as_string() else { return };
        let inbound = inner.core.borrow_mut().receive(attempt, &text);
        match inbound {
            Inbound::Dispatch(event) => {
                inner.listeners.emit(&event);
            }
            Inbound::Coalesced { schedule_flush } => {
                if schedule_flush {
                    request_flush(&inner);
                }
            }
            Inbound::Dropped(e) => {
                web_sys::console::warn_1(&format!("Dropped message: {}", e).into());
            }
            Inbound::Stale => {}
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    on_message.forget();

    let weak = Rc::downgrade(inner);
    let on_close = Closure::wrap(Box::new(move |event: CloseEvent| {
        let Some(inner) = weak.upgrade() else { return };
        let ticket = inner.core.borrow_mut().closed(attempt);
        if ticket.is_some() {
            web_sys::console::log_1(
                &format!("WebSocket closed: code={}, reason={}", event.code(), event.reason()).into(),
            );
        }
        release(&inner, attempt);
        schedule_reconnect(&inner, ticket);
        report(&inner);
    }) as Box<dyn FnMut(CloseEvent)>);
    ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
    on_close.forget();

    let weak = Rc::downgrade(inner);
    let on_error = Closure::wrap(Box::new(move |e: JsValue| {
        let Some(inner) = weak.upgrade() else { return };
        let ticket = inner.core.borrow_mut().errored(attempt);
        if ticket.is_some() {
            web_sys::console::error_1(&format!("WebSocket error: {:?}", e).into());
        }
        release(&inner, attempt);
        schedule_reconnect(&inner, ticket);
        report(&inner);
    }) as Box<dyn FnMut(JsValue)>);
    ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    on_error.forget();
}

/// Forget the socket of `attempt` if it is still the current one
fn release(inner: &Inner, attempt: ConnectAttempt) {
    let mut socket = inner.socket.borrow_mut();
    if matches!(socket.as_ref(), Some((current, _)) if *current == attempt) {
        *socket = None;
    }
}

fn schedule_reconnect(inner: &Rc<Inner>, ticket: Option<ReconnectTicket>) {
    let Some(ticket) = ticket else { return };
    web_sys::console::log_1(
        &format!("Reconnecting in {} ms", ticket.delay.as_millis()).into(),
    );

    let weak: Weak<Inner> = Rc::downgrade(inner);
    let delay = u32::try_from(ticket.delay.as_millis()).unwrap_or(u32::MAX);
    // Superseded or cancelled tickets are refused by the core
    gloo_timers::callback::Timeout::new(delay, move || {
        let Some(inner) = weak.upgrade() else { return };
        let attempt = inner.core.borrow_mut().reconnect_due(ticket);
        if let Some(attempt) = attempt {
            open(&inner, attempt);
        }
    })
    .forget();
}

fn request_flush(inner: &Rc<Inner>) {
    let weak = Rc::downgrade(inner);
    let flush = Closure::once_into_js(move || {
        let Some(inner) = weak.upgrade() else { return };
        let events = inner.core.borrow_mut().flush();
        for event in &events {
            inner.listeners.emit(event);
        }
    });

    let scheduled = web_sys::window()
        .map(|w| w.request_animation_frame(flush.unchecked_ref()).is_ok())
        .unwrap_or(false);
    if !scheduled {
        // No animation frames (background worker); flush right away
        let events = inner.core.borrow_mut().flush();
        for event in &events {
            inner.listeners.emit(event);
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_send_while_idle_returns_false() {
        let client = WebSocketClient::new("http://127.0.0.1:9");
        assert_eq!(client.url(), "ws://127.0.0.1:9");
        assert_eq!(client.status(), ConnectionStatus::Idle);
        assert!(!client.get_pointers());
        assert!(!client.remove_pointer("a"));
    }

    #[wasm_bindgen_test]
    fn test_duplicate_connect_opens_one_socket() {
        let client = WebSocketClient::new("ws://127.0.0.1:9");
        client.connect();
        client.connect();
        assert_eq!(client.status(), ConnectionStatus::Connecting);
        assert_eq!(client.inner.core.borrow().attempts(), 1);

        client.disconnect();
        assert_eq!(client.status(), ConnectionStatus::Idle);
        assert!(client.inner.socket.borrow().is_none());
    }
}
