//! WebSocket Protocol
//!
//! Message types exchanged with the tracking server over WebSocket.
//!
//! Every frame is a JSON text envelope:
//!
//! ```text
//! {"event": "<name>", "data": <payload>}
//! ```
//!
//! Some server endpoints put the payload under `payload` or `datas` instead
//! of `data`. [`Envelope::parse`] accepts all three and hands the rest of the
//! crate one canonical shape.
//!
//! - [`ClientCommand`]: everything the dashboard sends
//! - [`ServerEvent`]: typed inbound events, decoded from an [`Envelope`]
//! - [`ProtocolError`]: malformed JSON, unknown event names, bad payloads

mod envelope;
mod error;
mod messages;

pub use envelope::{DataField, Envelope};
pub use error::{ProtocolError, ProtocolResult};
pub use messages::{ClientCommand, ConnectedInfo, DetailPayload, EventKind, Feed, ServerEvent};
