//! Reconnecting WebSocket Transport
//!
//! One shared connection to the tracking server, used by every live view.
//!
//! ## Architecture
//!
//! - **TransportCore**: connection state machine, reconnect slot and move
//!   coalescing. Pure, no I/O, shared by the native and browser drivers.
//! - **ListenerRegistry**: typed publish/subscribe with RAII
//!   [`Subscription`] tokens.
//! - **SocketService** (native): tokio driver around `tokio-tungstenite`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use geotrack::config::TransportConfig;
//! use geotrack::protocol::EventKind;
//! use geotrack::transport::SocketService;
//!
//! #[tokio::main]
//! async fn main() {
//!     let socket = SocketService::new("http://localhost:3001", TransportConfig::default());
//!     let _sub = socket.on(EventKind::Pointers, |event| println!("{:?}", event));
//!     socket.connect();
//!     tokio::signal::ctrl_c().await.ok();
//!     socket.disconnect();
//! }
//! ```

mod coalesce;
mod reconnect;
mod registry;
#[cfg(feature = "native")]
mod socket;
mod state;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use coalesce::MoveCoalescer;
pub use reconnect::{ReconnectTicket, ReconnectTimer, DEFAULT_RECONNECT_DELAY};
pub use registry::{ConnectionStatus, ListenerRegistry, Subscription};
#[cfg(feature = "native")]
pub use socket::{SocketService, TransportError};
pub use state::{ConnectAttempt, Inbound, TransportCore};

/// Close code sent on a deliberate disconnect
pub const NORMAL_CLOSE_CODE: u16 = 1000;

/// Close reason sent on a deliberate disconnect
pub const CLOSE_REASON: &str = "Client disconnected";

/// Rewrite an `http(s)` base URL to its `ws(s)` equivalent
///
/// URLs already using `ws`/`wss` are returned unchanged.
pub fn websocket_url(base: &str) -> String {
    let trimmed = base.trim();
    if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        trimmed.to_string()
    }
}

/// Lock a mutex, recovering the data if a listener panicked while holding it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_url_rewrite() {
        assert_eq!(websocket_url("http://localhost:3001"), "ws://localhost:3001");
        assert_eq!(websocket_url("https://track.example.com"), "wss://track.example.com");
        assert_eq!(websocket_url("ws://already:1"), "ws://already:1");
        assert_eq!(websocket_url(" http://padded "), "ws://padded");
    }
}
