//! Frame envelope
//!
//! Normalizes the `data` / `payload` / `datas` inconsistency of the server
//! into a single [`Envelope`] shape.

use serde::Deserialize;
use serde_json::Value;

use super::error::{ProtocolError, ProtocolResult};

/// Which key carried the payload of an inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataField {
    /// The canonical `data` key
    Data,
    /// `payload` (realtime monitor endpoints)
    Payload,
    /// `datas`
    Datas,
    /// No payload at all
    Absent,
}

impl DataField {
    /// True when the frame used a non-canonical key
    pub fn is_legacy(self) -> bool {
        matches!(self, DataField::Payload | DataField::Datas)
    }
}

/// A decoded `{event, data}` frame
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub event: String,
    /// Payload, `Value::Null` when absent
    pub data: Value,
    /// Key the payload was found under
    pub field: DataField,
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    payload: Option<Value>,
    #[serde(default)]
    datas: Option<Value>,
}

impl Envelope {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        let field = if data.is_null() {
            DataField::Absent
        } else {
            DataField::Data
        };
        Self {
            event: event.into(),
            data,
            field,
        }
    }

    /// Parse an inbound text frame
    ///
    /// Payload precedence is `data`, then `payload`, then `datas`.
    pub fn parse(text: &str) -> ProtocolResult<Self> {
        let raw: RawEnvelope =
            serde_json::from_str(text).map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;

        let event = raw
            .event
            .filter(|e| !e.is_empty())
            .ok_or(ProtocolError::MissingEvent)?;

        let (data, field) = if let Some(data) = raw.data {
            (data, DataField::Data)
        } else if let Some(payload) = raw.payload {
            (payload, DataField::Payload)
        } else if let Some(datas) = raw.datas {
            (datas, DataField::Datas)
        } else {
            (Value::Null, DataField::Absent)
        };

        if field.is_legacy() {
            tracing::debug!(event = %event, field = ?field, "Frame uses non-canonical payload key");
        }

        Ok(Self { event, data, field })
    }

    /// Serialize as an outbound text frame (`data` omitted when null)
    pub fn to_text(&self) -> ProtocolResult<String> {
        let mut frame = serde_json::Map::new();
        frame.insert("event".to_string(), Value::String(self.event.clone()));
        if !self.data.is_null() {
            frame.insert("data".to_string(), self.data.clone());
        }
        serde_json::to_string(&frame).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_data_field() {
        let env = Envelope::parse(r#"{"event":"pointers","data":[]}"#).unwrap();
        assert_eq!(env.event, "pointers");
        assert_eq!(env.data, json!([]));
        assert_eq!(env.field, DataField::Data);
    }

    #[test]
    fn test_parse_payload_and_datas() {
        let env = Envelope::parse(r#"{"event":"realtimeMonitor","payload":[1]}"#).unwrap();
        assert_eq!(env.data, json!([1]));
        assert_eq!(env.field, DataField::Payload);

        let env = Envelope::parse(r#"{"event":"detailActivity","datas":{"a":1}}"#).unwrap();
        assert_eq!(env.data, json!({"a": 1}));
        assert_eq!(env.field, DataField::Datas);
        assert!(env.field.is_legacy());
    }

    #[test]
    fn test_data_takes_precedence() {
        let env = Envelope::parse(r#"{"event":"x","payload":1,"data":2}"#).unwrap();
        assert_eq!(env.data, json!(2));
    }

    #[test]
    fn test_parse_without_payload() {
        let env = Envelope::parse(r#"{"event":"connected"}"#).unwrap();
        assert_eq!(env.data, Value::Null);
        assert_eq!(env.field, DataField::Absent);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Envelope::parse("not json"),
            Err(ProtocolError::MalformedJson(_))
        ));
        assert!(matches!(
            Envelope::parse("[1,2,3]"),
            Err(ProtocolError::MalformedJson(_))
        ));
        assert_eq!(
            Envelope::parse(r#"{"data":1}"#),
            Err(ProtocolError::MissingEvent)
        );
        assert_eq!(
            Envelope::parse(r#"{"event":""}"#),
            Err(ProtocolError::MissingEvent)
        );
    }

    #[test]
    fn test_to_text_omits_null_data() {
        let env = Envelope::new("getPointers", Value::Null);
        assert_eq!(env.to_text().unwrap(), r#"{"event":"getPointers"}"#);
    }
}
