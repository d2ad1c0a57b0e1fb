//! Timeline types
//!
//! A timeline is one tracking session of a device. A timeline without an end
//! time is still running ("ongoing").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::location::{LocationEvent, LocationSample};

/// A tracked device as joined into timeline rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub os: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A tracking session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub id: String,
    pub device_id: String,
    pub start_time: DateTime<Utc>,
    /// `None` while the session is still running
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// The server joins the device under a capitalized key
    #[serde(rename = "Device", default)]
    pub device: Device,
}

impl Timeline {
    /// True while the session has no end time
    pub fn is_ongoing(&self) -> bool {
        self.end_time.is_none()
    }

    /// Device name for display; empty names become "Unknown"
    pub fn device_name(&self) -> &str {
        if self.device.name.trim().is_empty() {
            "Unknown"
        } else {
            &self.device.name
        }
    }
}

/// A timeline on the realtime monitor, with samples accumulated live
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoredTimeline {
    #[serde(flatten)]
    pub timeline: Timeline,
    #[serde(default)]
    pub locations: Vec<LocationSample>,
}

impl MonitoredTimeline {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            locations: Vec::new(),
        }
    }

    /// Latest live sample, if any arrived
    pub fn last_location(&self) -> Option<&LocationSample> {
        self.locations.last()
    }
}

/// Minimal device information sent with a realtime timeline detail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeviceSummary {
    #[serde(default)]
    pub name: String,
}

/// Payload of the realtime timeline detail feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TimelineDetail {
    #[serde(default)]
    pub device: DeviceSummary,
    #[serde(default)]
    pub locations: Vec<LocationEvent>,
}
