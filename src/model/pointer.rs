//! Pointer types
//!
//! A pointer is one live device marker on the multi-pointer map. The server
//! owns pointer state; the client mirrors it and patches positions in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Offset this coordinate by the given deltas
    pub fn offset(self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.latitude + d_lat, self.longitude + d_lng)
    }
}

/// A tracked device marker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pointer {
    /// Unique among currently tracked pointers
    pub id: String,
    pub device_id: String,
    pub device_name: String,
    /// Operating system label (e.g. "Android 14")
    pub os: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Last update time as sent by the server (ISO 8601)
    pub timestamp: String,
}

impl Pointer {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Parse the server timestamp, if it is RFC 3339
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Patch this pointer with the fields present in `patch`
    ///
    /// Returns `false` (and leaves the pointer untouched) when the patch
    /// targets a different id.
    pub fn apply(&mut self, patch: &PointerPatch) -> bool {
        if patch.id != self.id {
            return false;
        }
        if let Some(device_id) = &patch.device_id {
            self.device_id = device_id.clone();
        }
        if let Some(device_name) = &patch.device_name {
            self.device_name = device_name.clone();
        }
        if let Some(os) = &patch.os {
            self.os = os.clone();
        }
        if let Some(latitude) = patch.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = patch.longitude {
            self.longitude = longitude;
        }
        if let Some(timestamp) = &patch.timestamp {
            self.timestamp = timestamp.clone();
        }
        true
    }
}

/// A (possibly partial) pointer update carried by `pointerMoved`
///
/// Only `id` is required; fields that are present overwrite the tracked
/// pointer, absent fields keep their current value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PointerPatch {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl PointerPatch {
    /// A position-only patch
    pub fn moved(id: impl Into<String>, position: LatLng) -> Self {
        Self {
            id: id.into(),
            latitude: Some(position.latitude),
            longitude: Some(position.longitude),
            ..Default::default()
        }
    }

    /// Fold a later patch for the same pointer into this one (later fields win)
    pub fn merge(&mut self, later: PointerPatch) {
        debug_assert_eq!(self.id, later.id);
        if later.device_id.is_some() {
            self.device_id = later.device_id;
        }
        if later.device_name.is_some() {
            self.device_name = later.device_name;
        }
        if later.os.is_some() {
            self.os = later.os;
        }
        if later.latitude.is_some() {
            self.latitude = later.latitude;
        }
        if later.longitude.is_some() {
            self.longitude = later.longitude;
        }
        if later.timestamp.is_some() {
            self.timestamp = later.timestamp;
        }
    }

    /// The patched position, when both coordinates are present
    pub fn position(&self) -> Option<LatLng> {
        Some(LatLng::new(self.latitude?, self.longitude?))
    }
}

impl From<Pointer> for PointerPatch {
    fn from(pointer: Pointer) -> Self {
        Self {
            id: pointer.id,
            device_id: Some(pointer.device_id),
            device_name: Some(pointer.device_name),
            os: Some(pointer.os),
            latitude: Some(pointer.latitude),
            longitude: Some(pointer.longitude),
            timestamp: Some(pointer.timestamp),
        }
    }
}

/// Identifies a pointer (payload of `pointerRemoved`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointerRef {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer() -> Pointer {
        Pointer {
            id: "p1".to_string(),
            device_id: "dev-0001-abcdef".to_string(),
            device_name: "Pixel".to_string(),
            os: "Android".to_string(),
            latitude: -6.2,
            longitude: 106.8,
            timestamp: "2024-05-01T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_pointer_deserialize_camel_case() {
        let json = r#"{"id":"a","deviceId":"d","deviceName":"Phone","os":"iOS",
            "latitude":1.5,"longitude":2.5,"timestamp":"2024-05-01T10:00:00Z"}"#;
        let p: Pointer = serde_json::from_str(json).unwrap();
        assert_eq!(p.device_name, "Phone");
        assert_eq!(p.position(), LatLng::new(1.5, 2.5));
        assert!(p.updated_at().is_some());
    }

    #[test]
    fn test_apply_partial_patch_keeps_other_fields() {
        let mut p = pointer();
        let patch = PointerPatch::moved("p1", LatLng::new(1.0, 2.0));
        assert!(p.apply(&patch));
        assert_eq!(p.latitude, 1.0);
        assert_eq!(p.longitude, 2.0);
        assert_eq!(p.device_name, "Pixel");
    }

    #[test]
    fn test_apply_ignores_other_id() {
        let mut p = pointer();
        let patch = PointerPatch::moved("other", LatLng::new(1.0, 2.0));
        assert!(!p.apply(&patch));
        assert_eq!(p, pointer());
    }

    #[test]
    fn test_merge_later_wins() {
        let mut first = PointerPatch::moved("p1", LatLng::new(1.0, 1.0));
        first.os = Some("Android".to_string());
        first.merge(PointerPatch::moved("p1", LatLng::new(3.0, 4.0)));
        assert_eq!(first.position(), Some(LatLng::new(3.0, 4.0)));
        assert_eq!(first.os.as_deref(), Some("Android"));
    }

    #[test]
    fn test_unparseable_timestamp() {
        let mut p = pointer();
        p.timestamp = "yesterday".to_string();
        assert!(p.updated_at().is_none());
    }
}
