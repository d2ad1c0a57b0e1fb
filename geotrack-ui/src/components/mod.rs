//! UI Components
//!
//! Reusable Leptos components for the dashboard.

pub mod loading;
pub mod map;
pub mod nav;
pub mod status;

pub use loading::{ErrorAlert, ListSkeleton, Loading};
pub use map::MapView;
pub use nav::Nav;
pub use status::{ReconnectButton, StatusChip};
