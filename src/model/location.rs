//! Location types
//!
//! Position samples recorded within a timeline, plus the live
//! `locationUpdate` payload of the realtime monitor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::pointer::LatLng;

/// One recorded position sample of a timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationEvent {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub device_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Serialized reverse-geocoding payload (JSON text with address fields)
    #[serde(default, deserialize_with = "reverse_data")]
    pub reverse_data: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(rename = "timeLineId", default)]
    pub timeline_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LocationEvent {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Event type for display ("-" when the server sent none)
    pub fn event_type_label(&self) -> &str {
        self.event_type.as_deref().unwrap_or("-")
    }
}

/// A live position sample appended to a monitored timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, deserialize_with = "reverse_data")]
    pub reverse_data: Option<String>,
}

/// Payload of the `locationUpdate` event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub device_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, deserialize_with = "reverse_data")]
    pub reverse_data: Option<String>,
}

impl LocationUpdate {
    pub fn into_sample(self) -> LocationSample {
        LocationSample {
            latitude: self.latitude,
            longitude: self.longitude,
            reverse_data: self.reverse_data,
        }
    }
}

/// Accept the reverse payload either as JSON text or as an inline object.
///
/// Inline objects are re-serialized so formatting always works on text.
fn reverse_data<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_event_full() {
        let json = r#"{
            "id": 42,
            "deviceId": "d1",
            "latitude": -6.2,
            "longitude": 106.8,
            "reverseData": "{\"village\":\"Menteng\"}",
            "eventType": "moving",
            "timeLineId": "t1",
            "createdAt": "2024-05-01T08:05:00.000Z",
            "updatedAt": "2024-05-01T08:05:00.000Z"
        }"#;
        let loc: LocationEvent = serde_json::from_str(json).unwrap();
        assert_eq!(loc.id, Some(42));
        assert_eq!(loc.timeline_id.as_deref(), Some("t1"));
        assert_eq!(loc.reverse_data.as_deref(), Some(r#"{"village":"Menteng"}"#));
        assert_eq!(loc.event_type_label(), "moving");
    }

    #[test]
    fn test_reverse_data_inline_object() {
        let json = r#"{"latitude": 1.0, "longitude": 2.0, "reverseData": {"state": "Bali"}}"#;
        let loc: LocationEvent = serde_json::from_str(json).unwrap();
        assert_eq!(loc.reverse_data.as_deref(), Some(r#"{"state":"Bali"}"#));
        assert_eq!(loc.event_type_label(), "-");
    }

    #[test]
    fn test_reverse_data_null() {
        let json = r#"{"latitude": 1.0, "longitude": 2.0, "reverseData": null}"#;
        let loc: LocationEvent = serde_json::from_str(json).unwrap();
        assert!(loc.reverse_data.is_none());
    }

    #[test]
    fn test_location_update_into_sample() {
        let json = r#"{"deviceId": "d9", "latitude": 3.0, "longitude": 4.0}"#;
        let update: LocationUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.device_id, "d9");
        let sample = update.into_sample();
        assert_eq!(sample.latitude, 3.0);
        assert!(sample.reverse_data.is_none());
    }
}
