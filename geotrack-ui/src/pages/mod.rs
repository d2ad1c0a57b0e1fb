//! Pages
//!
//! Top-level page components for each route.

pub mod history;
pub mod history_detail;
pub mod multi_pointer;
pub mod realtime_detail;
pub mod realtime_monitor;

pub use history::History;
pub use history_detail::HistoryDetail;
pub use multi_pointer::MultiPointer;
pub use realtime_detail::RealtimeDetail;
pub use realtime_monitor::RealtimeMonitor;
