//! Map Overlays
//!
//! Pure conversion of points into what a map draws: a center, one marker
//! per point with popup lines, and a connecting path when there is more
//! than one point. Inputs are never mutated; callers rebuild the overlay
//! whenever their data changes.

use serde::Serialize;

use super::address::format_address;
use super::labels::{coordinate, pointer_updated_label, short_device_id};
use crate::model::{LatLng, LocationEvent, LocationSample, Pointer};

/// Center of an empty location map
pub const ORIGIN: LatLng = LatLng {
    latitude: 0.0,
    longitude: 0.0,
};

/// Center of an empty pointer map (Jakarta)
pub const DEFAULT_POINTER_CENTER: LatLng = LatLng {
    latitude: -6.2088,
    longitude: 106.8456,
};

/// One marker and its popup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Stable key (pointer id, location id or index)
    pub key: String,
    pub position: LatLng,
    /// Bold first line of the popup
    pub title: String,
    /// Remaining popup lines
    pub lines: Vec<String>,
}

/// Everything a map needs to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapOverlay {
    pub center: LatLng,
    pub markers: Vec<Marker>,
    /// Connecting line, present only for two or more points
    pub path: Option<Vec<LatLng>>,
}

impl MapOverlay {
    /// Overlay of recorded timeline locations, connected in order
    pub fn from_locations(locations: &[LocationEvent]) -> Self {
        let markers = locations
            .iter()
            .enumerate()
            .map(|(index, location)| Marker {
                key: location
                    .id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| index.to_string()),
                position: location.position(),
                title: format!("Event Type: {}", location.event_type_label()),
                lines: vec![format!(
                    "Address: {}",
                    format_address(location.reverse_data.as_deref())
                )],
            })
            .collect();
        Self::assemble(markers, ORIGIN, true)
    }

    /// Overlay of live samples of a monitored timeline
    pub fn from_samples(samples: &[LocationSample]) -> Self {
        let markers = samples
            .iter()
            .enumerate()
            .map(|(index, sample)| Marker {
                key: index.to_string(),
                position: LatLng::new(sample.latitude, sample.longitude),
                title: format_address(sample.reverse_data.as_deref()),
                lines: Vec::new(),
            })
            .collect();
        Self::assemble(markers, ORIGIN, true)
    }

    /// Overlay of live pointers; pointers are independent, so no path
    pub fn from_pointers(pointers: &[Pointer]) -> Self {
        let markers = pointers
            .iter()
            .map(|pointer| Marker {
                key: pointer.id.clone(),
                position: pointer.position(),
                title: pointer.device_name.clone(),
                lines: vec![
                    pointer.os.clone(),
                    format!("Device ID: {}", short_device_id(&pointer.device_id)),
                    format!("Lat: {}", coordinate(pointer.latitude)),
                    format!("Lng: {}", coordinate(pointer.longitude)),
                    format!("Updated: {}", pointer_updated_label(pointer)),
                ],
            })
            .collect();
        Self::assemble(markers, DEFAULT_POINTER_CENTER, false)
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Smallest box containing every marker, as (south-west, north-east)
    pub fn bounds(&self) -> Option<(LatLng, LatLng)> {
        let first = self.markers.first()?.position;
        Some(self.markers.iter().skip(1).fold((first, first), |(sw, ne), m| {
            (
                LatLng::new(sw.latitude.min(m.position.latitude), sw.longitude.min(m.position.longitude)),
                LatLng::new(ne.latitude.max(m.position.latitude), ne.longitude.max(m.position.longitude)),
            )
        }))
    }

    fn assemble(markers: Vec<Marker>, fallback: LatLng, connect: bool) -> Self {
        let center = markers.first().map(|m| m.position).unwrap_or(fallback);
        let path = (connect && markers.len() > 1)
            .then(|| markers.iter().map(|m| m.position).collect());
        Self {
            center,
            markers,
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(id: i64, lat: f64, reverse: Option<&str>) -> LocationEvent {
        LocationEvent {
            id: Some(id),
            device_id: None,
            latitude: lat,
            longitude: 106.8,
            reverse_data: reverse.map(str::to_string),
            event_type: Some("moving".into()),
            timeline_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_empty_maps_use_defaults() {
        let overlay = MapOverlay::from_locations(&[]);
        assert_eq!(overlay.center, ORIGIN);
        assert!(overlay.path.is_none());
        assert!(overlay.bounds().is_none());

        assert_eq!(MapOverlay::from_pointers(&[]).center, DEFAULT_POINTER_CENTER);
    }

    #[test]
    fn test_single_point_has_no_path() {
        let overlay = MapOverlay::from_locations(&[location(1, -6.0, None)]);
        assert_eq!(overlay.markers.len(), 1);
        assert!(overlay.path.is_none());
        assert_eq!(overlay.center, LatLng::new(-6.0, 106.8));
    }

    #[test]
    fn test_path_follows_input_order() {
        let locations = vec![location(1, -6.0, None), location(2, -6.1, None), location(3, -5.9, None)];
        let overlay = MapOverlay::from_locations(&locations);
        let path = overlay.path.clone().unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[1], LatLng::new(-6.1, 106.8));
        assert_eq!(overlay.markers[2].key, "3");

        let (sw, ne) = overlay.bounds().unwrap();
        assert_eq!(sw.latitude, -6.1);
        assert_eq!(ne.latitude, -5.9);
    }

    #[test]
    fn test_popup_address_fallback() {
        let overlay = MapOverlay::from_locations(&[location(1, 0.0, Some("{broken"))]);
        assert_eq!(overlay.markers[0].title, "Event Type: moving");
        assert_eq!(overlay.markers[0].lines, vec!["Address: Unknown Address"]);
    }

    #[test]
    fn test_pointer_popup() {
        let pointer = Pointer {
            id: "p1".into(),
            device_id: "abcdef0123456789".into(),
            device_name: "Truck".into(),
            os: "iOS".into(),
            latitude: 1.5,
            longitude: 2.25,
            timestamp: String::new(),
        };
        let overlay = MapOverlay::from_pointers(std::slice::from_ref(&pointer));
        let marker = &overlay.markers[0];
        assert_eq!(marker.title, "Truck");
        assert_eq!(marker.lines[1], "Device ID: abcdef01...");
        assert_eq!(marker.lines[2], "Lat: 1.500000");
        assert_eq!(overlay.center, LatLng::new(1.5, 2.25));
    }
}
