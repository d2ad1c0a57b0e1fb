//! Rendering Helpers
//!
//! Turning model data into what users see: addresses, labels, map overlays
//! and text tables. Everything here is pure.

mod address;
mod labels;
mod map;
mod table;

pub use address::{format_address, short_address, AddressParts, UNKNOWN_ADDRESS};
pub use labels::{
    chip_initial, chip_label, clock_label, coordinate, end_label, format_optional,
    format_timestamp, jitter, pointer_updated_label, short_device_id, start_label,
    MOVE_JITTER_DEGREES, NO_ACTIVE_DEVICES, ONGOING,
};
pub use map::{MapOverlay, Marker, DEFAULT_POINTER_CENTER, ORIGIN};
pub use table::{locations_table, monitor_table, pointers_table, timelines_table, TextTable};
