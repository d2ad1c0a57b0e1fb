//! WebSocket Message Types
//!
//! Commands sent by the dashboard and the typed events it receives.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::envelope::Envelope;
use super::error::{ProtocolError, ProtocolResult};
use crate::model::{
    LocationUpdate, MonitoredTimeline, Pointer, PointerPatch, PointerRef, TimelineDetail,
};

/// Live feeds a page can subscribe to (and later unsubscribe from)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Feed {
    /// All active timelines
    RealtimeMonitor,
    /// Active timelines (alternate endpoint)
    ActiveTimeline,
    /// One timeline's locations, live
    TimelineDetailRealtime,
    /// One timeline's activity
    DetailActivity,
}

impl Feed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::RealtimeMonitor => "realtimeMonitor",
            Feed::ActiveTimeline => "activeTimeline",
            Feed::TimelineDetailRealtime => "timelineDetailRealtime",
            Feed::DetailActivity => "detailActivity",
        }
    }
}

/// Messages sent from the dashboard to the server
///
/// Serializes to `{"event": "<name>", "data": {...}}`; unit commands omit
/// `data`.
///
/// Subscription fields always travel inside `data`: an unsubscribe is
/// `{"event":"unsubscribe","data":{"type":"timelineDetailRealtime","timelineId":"t-1"}}`
/// and `realtimeMonitor` sends `"data": {}`. Servers that read `timelineId`
/// or `type` from the top level, or expect a `payload` key, will not see them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientCommand {
    /// Request the full pointer set
    GetPointers,
    /// Create a pointer at a position
    AddPointer { latitude: f64, longitude: f64 },
    /// Delete a pointer
    RemovePointer { id: String },
    /// Move a pointer
    MovePointer {
        id: String,
        latitude: f64,
        longitude: f64,
    },
    /// Subscribe to the realtime monitor feed
    RealtimeMonitor {},
    /// Subscribe to the active timeline feed
    ActiveTimeline {},
    /// Subscribe to one timeline's live detail
    TimelineDetailRealtime { timeline_id: String },
    /// Subscribe to one timeline's activity
    DetailActivity { timeline_id: String },
    /// Leave a feed
    Unsubscribe {
        #[serde(rename = "type")]
        feed: Feed,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeline_id: Option<String>,
    },
}

impl ClientCommand {
    /// Event name of this command
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientCommand::GetPointers => "getPointers",
            ClientCommand::AddPointer { .. } => "addPointer",
            ClientCommand::RemovePointer { .. } => "removePointer",
            ClientCommand::MovePointer { .. } => "movePointer",
            ClientCommand::RealtimeMonitor {} => "realtimeMonitor",
            ClientCommand::ActiveTimeline {} => "activeTimeline",
            ClientCommand::TimelineDetailRealtime { .. } => "timelineDetailRealtime",
            ClientCommand::DetailActivity { .. } => "detailActivity",
            ClientCommand::Unsubscribe { .. } => "unsubscribe",
        }
    }

    /// Subscribe command for a feed
    pub fn subscribe(feed: Feed, timeline_id: Option<String>) -> Self {
        match (feed, timeline_id) {
            (Feed::RealtimeMonitor, _) => ClientCommand::RealtimeMonitor {},
            (Feed::ActiveTimeline, _) => ClientCommand::ActiveTimeline {},
            (Feed::TimelineDetailRealtime, id) => ClientCommand::TimelineDetailRealtime {
                timeline_id: id.unwrap_or_default(),
            },
            (Feed::DetailActivity, id) => ClientCommand::DetailActivity {
                timeline_id: id.unwrap_or_default(),
            },
        }
    }

    /// Serialize to a text frame
    pub fn encode(&self) -> ProtocolResult<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

/// Inbound event names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Pointers,
    PointerAdded,
    PointerRemoved,
    PointerMoved,
    Connected,
    RealtimeMonitor,
    LocationUpdate,
    ActiveTimeline,
    DetailActivity,
    TimelineDetailRealtime,
}

impl EventKind {
    /// Every inbound event kind
    pub fn all() -> &'static [EventKind] {
        &[
            EventKind::Pointers,
            EventKind::PointerAdded,
            EventKind::PointerRemoved,
            EventKind::PointerMoved,
            EventKind::Connected,
            EventKind::RealtimeMonitor,
            EventKind::LocationUpdate,
            EventKind::ActiveTimeline,
            EventKind::DetailActivity,
            EventKind::TimelineDetailRealtime,
        ]
    }

    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Pointers => "pointers",
            EventKind::PointerAdded => "pointerAdded",
            EventKind::PointerRemoved => "pointerRemoved",
            EventKind::PointerMoved => "pointerMoved",
            EventKind::Connected => "connected",
            EventKind::RealtimeMonitor => "realtimeMonitor",
            EventKind::LocationUpdate => "locationUpdate",
            EventKind::ActiveTimeline => "activeTimeline",
            EventKind::DetailActivity => "detailActivity",
            EventKind::TimelineDetailRealtime => "timelineDetailRealtime",
        }
    }

    /// Look up a kind by wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.as_str() == name)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload of `connected`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConnectedInfo {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload of the timeline detail feeds: either the detail or a server error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DetailPayload {
    Failed { error: String },
    Detail(TimelineDetail),
}

/// Typed inbound events
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Full pointer set
    Pointers(Vec<Pointer>),
    PointerAdded(Pointer),
    PointerRemoved(PointerRef),
    PointerMoved(PointerPatch),
    Connected(ConnectedInfo),
    /// All active timelines (empty means none are active)
    RealtimeMonitor(Vec<MonitoredTimeline>),
    LocationUpdate(LocationUpdate),
    ActiveTimeline(Vec<MonitoredTimeline>),
    DetailActivity(DetailPayload),
    TimelineDetailRealtime(DetailPayload),
}

impl ServerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ServerEvent::Pointers(_) => EventKind::Pointers,
            ServerEvent::PointerAdded(_) => EventKind::PointerAdded,
            ServerEvent::PointerRemoved(_) => EventKind::PointerRemoved,
            ServerEvent::PointerMoved(_) => EventKind::PointerMoved,
            ServerEvent::Connected(_) => EventKind::Connected,
            ServerEvent::RealtimeMonitor(_) => EventKind::RealtimeMonitor,
            ServerEvent::LocationUpdate(_) => EventKind::LocationUpdate,
            ServerEvent::ActiveTimeline(_) => EventKind::ActiveTimeline,
            ServerEvent::DetailActivity(_) => EventKind::DetailActivity,
            ServerEvent::TimelineDetailRealtime(_) => EventKind::TimelineDetailRealtime,
        }
    }

    /// Decode a text frame into a typed event
    pub fn decode(text: &str) -> ProtocolResult<Self> {
        Self::from_envelope(Envelope::parse(text)?)
    }

    /// Decode an already-parsed envelope
    pub fn from_envelope(envelope: Envelope) -> ProtocolResult<Self> {
        let kind = EventKind::from_name(&envelope.event)
            .ok_or_else(|| ProtocolError::UnknownEvent(envelope.event.clone()))?;
        let data = envelope.data;

        Ok(match kind {
            EventKind::Pointers => ServerEvent::Pointers(payload(kind, data)?),
            EventKind::PointerAdded => ServerEvent::PointerAdded(payload(kind, data)?),
            EventKind::PointerRemoved => ServerEvent::PointerRemoved(payload(kind, data)?),
            EventKind::PointerMoved => ServerEvent::PointerMoved(payload(kind, data)?),
            EventKind::Connected => {
                if data.is_null() {
                    ServerEvent::Connected(ConnectedInfo::default())
                } else {
                    ServerEvent::Connected(payload(kind, data)?)
                }
            }
            EventKind::RealtimeMonitor => ServerEvent::RealtimeMonitor(payload(kind, data)?),
            EventKind::LocationUpdate => ServerEvent::LocationUpdate(payload(kind, data)?),
            EventKind::ActiveTimeline => ServerEvent::ActiveTimeline(payload(kind, data)?),
            EventKind::DetailActivity => ServerEvent::DetailActivity(payload(kind, data)?),
            EventKind::TimelineDetailRealtime => {
                ServerEvent::TimelineDetailRealtime(payload(kind, data)?)
            }
        })
    }
}

fn payload<T: serde::de::DeserializeOwned>(kind: EventKind, data: Value) -> ProtocolResult<T> {
    serde_json::from_value(data).map_err(|e| ProtocolError::InvalidPayload {
        event: kind.as_str().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_json(cmd: &ClientCommand) -> Value {
        serde_json::from_str(&cmd.encode().unwrap()).unwrap()
    }

    #[test]
    fn test_encode_unit_command() {
        assert_eq!(
            ClientCommand::GetPointers.encode().unwrap(),
            r#"{"event":"getPointers"}"#
        );
    }

    #[test]
    fn test_encode_commands_with_data() {
        assert_eq!(
            as_json(&ClientCommand::AddPointer {
                latitude: -6.2,
                longitude: 106.8
            }),
            json!({"event": "addPointer", "data": {"latitude": -6.2, "longitude": 106.8}})
        );
        assert_eq!(
            as_json(&ClientCommand::RemovePointer { id: "a".into() }),
            json!({"event": "removePointer", "data": {"id": "a"}})
        );
        assert_eq!(
            as_json(&ClientCommand::RealtimeMonitor {}),
            json!({"event": "realtimeMonitor", "data": {}})
        );
        assert_eq!(
            as_json(&ClientCommand::TimelineDetailRealtime {
                timeline_id: "t1".into()
            }),
            json!({"event": "timelineDetailRealtime", "data": {"timelineId": "t1"}})
        );
    }

    #[test]
    fn test_encode_unsubscribe() {
        let cmd = ClientCommand::Unsubscribe {
            feed: Feed::TimelineDetailRealtime,
            timeline_id: Some("t1".into()),
        };
        assert_eq!(
            as_json(&cmd),
            json!({"event": "unsubscribe", "data": {"type": "timelineDetailRealtime", "timelineId": "t1"}})
        );
        assert_eq!(cmd.event_name(), "unsubscribe");
    }

    #[test]
    fn test_command_event_names_match_wire() {
        let commands = [
            ClientCommand::GetPointers,
            ClientCommand::MovePointer {
                id: "a".into(),
                latitude: 0.0,
                longitude: 0.0,
            },
            ClientCommand::ActiveTimeline {},
            ClientCommand::DetailActivity {
                timeline_id: "t".into(),
            },
        ];
        for cmd in commands {
            assert_eq!(as_json(&cmd)["event"], cmd.event_name());
        }
    }

    #[test]
    fn test_command_roundtrip_through_server_parse() {
        let text = ClientCommand::MovePointer {
            id: "p".into(),
            latitude: 1.0,
            longitude: 2.0,
        }
        .encode()
        .unwrap();
        let back: ClientCommand = serde_json::from_str(&text).unwrap();
        assert!(matches!(back, ClientCommand::MovePointer { ref id, .. } if id == "p"));
    }

    #[test]
    fn test_event_kind_names() {
        for kind in EventKind::all() {
            assert_eq!(EventKind::from_name(kind.as_str()), Some(*kind));
        }
        assert_eq!(EventKind::from_name("nope"), None);
    }

    #[test]
    fn test_decode_pointers() {
        let text = r#"{"event":"pointers","data":[{"id":"a","deviceId":"d","deviceName":"A",
            "os":"iOS","latitude":1.0,"longitude":2.0,"timestamp":"2024-01-01T00:00:00Z"}]}"#;
        match ServerEvent::decode(text).unwrap() {
            ServerEvent::Pointers(list) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].id, "a");
            }
            other => panic!("Expected Pointers, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_partial_move() {
        let text = r#"{"event":"pointerMoved","data":{"id":"a","latitude":5.0,"longitude":6.0}}"#;
        let event = ServerEvent::decode(text).unwrap();
        assert_eq!(event.kind(), EventKind::PointerMoved);
        match event {
            ServerEvent::PointerMoved(patch) => {
                assert_eq!(patch.latitude, Some(5.0));
                assert!(patch.device_name.is_none());
            }
            _ => panic!("Expected PointerMoved"),
        }
    }

    #[test]
    fn test_decode_monitor_from_payload_key() {
        let text = r#"{"event":"realtimeMonitor","payload":[]}"#;
        assert_eq!(
            ServerEvent::decode(text).unwrap(),
            ServerEvent::RealtimeMonitor(vec![])
        );
    }

    #[test]
    fn test_decode_detail_error() {
        let text = r#"{"event":"timelineDetailRealtime","payload":{"error":"Timeline not found"}}"#;
        assert_eq!(
            ServerEvent::decode(text).unwrap(),
            ServerEvent::TimelineDetailRealtime(DetailPayload::Failed {
                error: "Timeline not found".into()
            })
        );
    }

    #[test]
    fn test_decode_detail() {
        let text = r#"{"event":"timelineDetailRealtime","payload":{"device":{"name":"Van"},
            "locations":[{"id":1,"latitude":1.0,"longitude":2.0,"reverseData":"{}","eventType":"stop",
            "createdAt":"2024-01-01T00:00:00Z"}]}}"#;
        match ServerEvent::decode(text).unwrap() {
            ServerEvent::TimelineDetailRealtime(DetailPayload::Detail(detail)) => {
                assert_eq!(detail.device.name, "Van");
                assert_eq!(detail.locations.len(), 1);
            }
            other => panic!("Expected detail, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_connected_without_data() {
        assert_eq!(
            ServerEvent::decode(r#"{"event":"connected"}"#).unwrap(),
            ServerEvent::Connected(ConnectedInfo::default())
        );
    }

    #[test]
    fn test_decode_unknown_event() {
        assert_eq!(
            ServerEvent::decode(r#"{"event":"teleport","data":{}}"#),
            Err(ProtocolError::UnknownEvent("teleport".into()))
        );
    }

    #[test]
    fn test_decode_invalid_payload() {
        let err = ServerEvent::decode(r#"{"event":"pointers","data":{"id":"a"}}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidPayload { ref event, .. } if event == "pointers"));
    }
}
