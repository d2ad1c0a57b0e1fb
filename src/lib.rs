//! # GeoTrack
//!
//! Live device tracking dashboard client: a reconnecting WebSocket
//! transport, the page state fed by it, and the rendering helpers shared by
//! the terminal views and the browser UI.
//!
//! ## Features
//!
//! - **One shared socket**: duplicate connects are no-ops, unexpected closes
//!   schedule exactly one reconnect, deliberate closes none
//! - **Typed events**: envelopes normalized at the boundary, listeners per
//!   event kind with RAII unsubscribe tokens
//! - **Move coalescing**: bursts of `pointerMoved` collapse to one update
//!   per pointer per frame
//! - **History**: REST access to recorded timelines
//!
//! ## Modules
//!
//! - [`model`]: pointers, timelines, locations
//! - [`protocol`]: wire envelope, commands and events
//! - [`transport`]: connection state machine, listeners, native driver
//! - [`store`]: page state
//! - [`render`]: addresses, labels, map overlays, tables
//! - [`api`]: history REST endpoints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use geotrack::config::Config;
//! use geotrack::transport::SocketService;
//! use geotrack::views::MultiPointerView;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load_default();
//!     let socket = SocketService::new(&config.server.websocket_url, config.transport.clone());
//!
//!     let view = MultiPointerView::mount(&socket);
//!     let mut changes = view.changes();
//!     while changes.changed().await.is_ok() {
//!         println!("{}", view.snapshot().count_label());
//!     }
//! }
//! ```

pub mod api;
pub mod config;
#[cfg(feature = "native")]
pub mod logging;
pub mod model;
pub mod protocol;
pub mod render;
pub mod store;
pub mod transport;
#[cfg(feature = "native")]
pub mod views;

// Re-export top-level types for convenience
pub use model::{
    Device, LatLng, LocationEvent, LocationSample, LocationUpdate, MonitoredTimeline, Pointer,
    PointerPatch, PointerRef, Timeline, TimelineDetail,
};

pub use protocol::{ClientCommand, Envelope, EventKind, Feed, ProtocolError, ServerEvent};

pub use transport::{
    ConnectionStatus, ListenerRegistry, Subscription, TransportCore, DEFAULT_RECONNECT_DELAY,
};

#[cfg(feature = "native")]
pub use transport::SocketService;

pub use store::{MonitorBoard, PointerStore, TimelineFeed, ViewState};

pub use api::{ApiError, ApiResponse};

pub use config::{Config, ConfigError, LoggingConfig, ServerConfig, TransportConfig};
