//! Global Application State
//!
//! The shared socket and its status, provided to every page.

use std::rc::Rc;

use geotrack::transport::{ConnectionStatus, Subscription};
use leptos::*;

use super::websocket::WebSocketClient;
use crate::api;

/// Global application state provided to all components
#[derive(Clone)]
pub struct GlobalState {
    /// The one WebSocket shared by all live pages
    pub socket: WebSocketClient,
    /// Connection status, mirrored from the socket
    pub status: RwSignal<ConnectionStatus>,
    /// REST API base URL
    pub api_base: String,
    _status_sub: Rc<Subscription>,
}

/// Provide global state to the component tree
///
/// The socket stays idle until a live page mounts.
pub fn provide_global_state() {
    let socket = WebSocketClient::new(&api::get_ws_base());
    let status = create_rw_signal(socket.status());
    let sub = socket.on_status(move |s| status.set(s));

    provide_context(GlobalState {
        socket,
        status,
        api_base: api::get_api_base(),
        _status_sub: Rc::new(sub),
    });
}

/// Global state from context
pub fn use_global_state() -> GlobalState {
    use_context::<GlobalState>().expect("GlobalState not found")
}
