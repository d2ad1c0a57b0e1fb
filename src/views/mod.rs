//! Page Subscribers
//!
//! Native counterparts of the dashboard pages. Live views attach listeners
//! to a shared [`SocketService`](crate::transport::SocketService), subscribe
//! on every open and detach on drop; history views load once over REST.

mod history;
mod live;
mod monitor;
mod pointers;
mod timeline;

pub use history::{load_history, DetailTab, HistoryDetail};
pub use live::LiveView;
pub use monitor::RealtimeMonitorView;
pub use pointers::MultiPointerView;
pub use timeline::TimelineLiveView;
