//! State Management
//!
//! Global application state, the WebSocket driver and page bindings.

pub mod global;
pub mod live;
pub mod websocket;

pub use global::{provide_global_state, use_global_state, GlobalState};
pub use live::{bind_store, on_every_open};
pub use websocket::WebSocketClient;
