//! Display labels shared by tables, popups and chips.

use chrono::{DateTime, Local, Utc};

use crate::model::{LatLng, Pointer, Timeline};

/// Label for a timeline without an end time
pub const ONGOING: &str = "Ongoing";

/// Shown when the pointer set is empty
pub const NO_ACTIVE_DEVICES: &str = "No active devices";

/// Maximum jitter of the demo "move" action, per axis
pub const MOVE_JITTER_DEGREES: f64 = 0.005;

/// Long timestamp, e.g. "Wednesday, 05/01/2024, 08:00"
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%A, %m/%d/%Y, %H:%M").to_string()
}

/// Long timestamp or "-" when absent
pub fn format_optional(at: Option<&DateTime<Utc>>) -> String {
    at.map(format_timestamp).unwrap_or_else(|| "-".to_string())
}

/// Start time column of a timeline row
pub fn start_label(timeline: &Timeline) -> String {
    format_timestamp(&timeline.start_time)
}

/// End time column: the formatted end time, or "Ongoing"
pub fn end_label(timeline: &Timeline) -> String {
    match &timeline.end_time {
        Some(end) => format_timestamp(end),
        None => ONGOING.to_string(),
    }
}

/// Wall-clock time in the local zone, for "Last update"
pub fn clock_label(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Pointer chip text, `Name (os)`
pub fn chip_label(pointer: &Pointer) -> String {
    format!("{} ({})", pointer.device_name, pointer.os)
}

/// Avatar letter of a pointer chip
pub fn chip_initial(pointer: &Pointer) -> String {
    pointer
        .device_name
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

/// First 8 characters of a device id, ellipsized
pub fn short_device_id(device_id: &str) -> String {
    let prefix: String = device_id.chars().take(8).collect();
    format!("{}...", prefix)
}

/// Coordinate with 6 decimals
pub fn coordinate(value: f64) -> String {
    format!("{:.6}", value)
}

/// Pointer update time, falling back to the raw server text
pub fn pointer_updated_label(pointer: &Pointer) -> String {
    match pointer.updated_at() {
        Some(at) => at
            .with_timezone(&Local)
            .format("%m/%d/%Y, %H:%M:%S")
            .to_string(),
        None => pointer.timestamp.clone(),
    }
}

/// Offset a position by up to [`MOVE_JITTER_DEGREES`] on each axis
///
/// `unit_lat` and `unit_lng` are uniform samples in `[0, 1)`; the caller
/// picks the random source.
pub fn jitter(position: LatLng, unit_lat: f64, unit_lng: f64) -> LatLng {
    let spread = MOVE_JITTER_DEGREES * 2.0;
    position.offset((unit_lat - 0.5) * spread, (unit_lng - 0.5) * spread)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn timeline(end: Option<DateTime<Utc>>) -> Timeline {
        Timeline {
            id: "t1".into(),
            device_id: "d1".into(),
            start_time: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
            end_time: end,
            created_at: None,
            updated_at: None,
            device: Default::default(),
        }
    }

    #[test]
    fn test_end_label_ongoing_or_formatted() {
        assert_eq!(end_label(&timeline(None)), "Ongoing");
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 17, 30, 0).unwrap();
        assert_eq!(end_label(&timeline(Some(end))), "Wednesday, 05/01/2024, 17:30");
        assert_eq!(start_label(&timeline(None)), "Wednesday, 05/01/2024, 08:00");
    }

    #[test]
    fn test_pointer_labels() {
        let pointer = Pointer {
            id: "p1".into(),
            device_id: "0123456789abcdef".into(),
            device_name: "truck".into(),
            os: "Android 14".into(),
            latitude: -6.2088,
            longitude: 106.8456,
            timestamp: "yesterday".into(),
        };
        assert_eq!(chip_label(&pointer), "truck (Android 14)");
        assert_eq!(chip_initial(&pointer), "T");
        assert_eq!(short_device_id(&pointer.device_id), "01234567...");
        assert_eq!(coordinate(pointer.latitude), "-6.208800");
        assert_eq!(pointer_updated_label(&pointer), "yesterday");
    }

    #[test]
    fn test_jitter_bounds() {
        let origin = LatLng::new(0.0, 0.0);
        assert_eq!(jitter(origin, 0.5, 0.5), origin);
        let low = jitter(origin, 0.0, 0.0);
        assert!((low.latitude + MOVE_JITTER_DEGREES).abs() < 1e-12);
        let high = jitter(origin, 0.999_999, 0.999_999);
        assert!(high.longitude < MOVE_JITTER_DEGREES);
    }
}
