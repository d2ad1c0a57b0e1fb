//! Data Model
//!
//! Wire types shared by the REST endpoints, the WebSocket feeds and the
//! dashboard views:
//!
//! - **pointer**: live device markers of the multi-pointer map
//! - **timeline**: tracking sessions and the devices they belong to
//! - **location**: recorded position samples and realtime location updates
//!
//! All types (de)serialize with the server's camelCase field names.

pub mod location;
pub mod pointer;
pub mod timeline;

pub use location::{LocationEvent, LocationSample, LocationUpdate};
pub use pointer::{LatLng, Pointer, PointerPatch, PointerRef};
pub use timeline::{Device, DeviceSummary, MonitoredTimeline, Timeline, TimelineDetail};
