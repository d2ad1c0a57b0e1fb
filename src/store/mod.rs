//! Page State
//!
//! What each page shows, updated from inbound events. Independent of how
//! the events arrive, so the terminal views and the browser UI share it.

mod feed;
mod monitor;
mod pointers;
mod view_state;

pub use feed::TimelineFeed;
pub use monitor::{MonitorBoard, NO_ACTIVE_TIMELINES};
pub use pointers::PointerStore;
pub use view_state::ViewState;
