//! Page bindings to the shared socket.
//!
//! A live page owns its store signal and its listener subscriptions; both
//! go away with the page's reactive owner, so nothing is dispatched into an
//! unmounted page.

use geotrack::protocol::{EventKind, ServerEvent};
use geotrack::transport::{ConnectionStatus, Subscription};
use leptos::*;

use super::global::GlobalState;
use super::websocket::WebSocketClient;

/// Route events of `kinds` into `store` until the page is cleaned up
pub fn bind_store<S>(
    socket: &WebSocketClient,
    kinds: &[EventKind],
    store: RwSignal<S>,
    apply: fn(&mut S, &ServerEvent) -> bool,
) where
    S: Send + Sync + 'static,
{
    let subs: Vec<Subscription> = kinds
        .iter()
        .map(|&kind| {
            socket.on(kind, move |event| {
                let _ = store.try_update(|s| apply(s, event));
            })
        })
        .collect();
    on_cleanup(move || drop(subs));
}

/// Run `on_open` now if connected and again after every (re)connect
///
/// Connects the socket when it is not already open.
pub fn on_every_open(state: &GlobalState, on_open: impl Fn(&WebSocketClient) + 'static) {
    let socket = state.socket.clone();
    let status = state.status;
    create_effect(move |prev: Option<ConnectionStatus>| {
        let now = status.get();
        if now.is_connected() && prev != Some(now) {
            on_open(&socket);
        }
        now
    });

    if !state.socket.is_connected() {
        state.socket.connect();
    }
}
