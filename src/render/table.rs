//! Plain-text tables for the terminal views and the CLI.

use super::address::short_address;
use super::labels::{end_label, format_optional, start_label};
use crate::model::{LocationEvent, MonitoredTimeline, Pointer, Timeline};

/// A left-aligned, column-padded text table
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|col| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(col))
                    .chain(std::iter::once(&self.headers[col]))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| {
            widths
                .iter()
                .enumerate()
                .map(|(col, width)| {
                    let cell = cells.get(col).map(String::as_str).unwrap_or("");
                    format!("{:<width$}", cell, width = *width)
                })
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = line(&self.headers);
        out.push('\n');
        out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1)));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for TextTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// History list: device name, start time, end time or "Ongoing"
pub fn timelines_table(timelines: &[Timeline]) -> TextTable {
    let mut table = TextTable::new(["ID", "Device Name", "Start Time", "End Time"]);
    for t in timelines {
        table.row([t.id.clone(), t.device_name().to_string(), start_label(t), end_label(t)]);
    }
    table
}

/// Realtime monitor list with the latest live sample
pub fn monitor_table(timelines: &[MonitoredTimeline]) -> TextTable {
    let mut table = TextTable::new(["Device Name", "Start Time", "End Time", "Last Position"]);
    for m in timelines {
        let last = m
            .last_location()
            .map(|s| format!("{:.6}, {:.6}", s.latitude, s.longitude))
            .unwrap_or_else(|| "-".to_string());
        table.row([
            m.timeline.device_name().to_string(),
            start_label(&m.timeline),
            end_label(&m.timeline),
            last,
        ]);
    }
    table
}

/// Location rows: lat, lng, event type, short address, time
pub fn locations_table(locations: &[LocationEvent]) -> TextTable {
    let mut table = TextTable::new(["Latitude", "Longitude", "Event Type", "Address", "Time"]);
    for l in locations {
        table.row([
            l.latitude.to_string(),
            l.longitude.to_string(),
            l.event_type_label().to_string(),
            short_address(l.reverse_data.as_deref()),
            format_optional(l.created_at.as_ref()),
        ]);
    }
    table
}

/// Pointer rows for the terminal multi-pointer view
pub fn pointers_table(pointers: &[Pointer]) -> TextTable {
    let mut table = TextTable::new(["ID", "Device", "OS", "Latitude", "Longitude"]);
    for p in pointers {
        table.row([
            p.id.clone(),
            p.device_name.clone(),
            p.os.clone(),
            format!("{:.6}", p.latitude),
            format!("{:.6}", p.longitude),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pads_columns() {
        let mut table = TextTable::new(["Name", "OS"]);
        table.row(["Truck", "Android"]).row(["Van", "iOS"]);
        let text = table.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name  | OS");
        assert_eq!(lines[1], "---------------");
        assert_eq!(lines[2], "Truck | Android");
        assert_eq!(lines[3], "Van   | iOS");
    }

    #[test]
    fn test_timelines_table_ongoing() {
        let timelines: Vec<Timeline> = serde_json::from_str(
            r#"[{"id":"t1","deviceId":"d1","startTime":"2024-05-01T08:00:00Z","endTime":null,"Device":{"name":""}}]"#,
        )
        .unwrap();
        let text = timelines_table(&timelines).render();
        assert!(text.contains("Unknown"));
        assert!(text.contains("Ongoing"));
    }

    #[test]
    fn test_locations_table_unknown_address() {
        let locations: Vec<LocationEvent> = serde_json::from_str(
            r#"[{"latitude":1.0,"longitude":2.0,"reverseData":"oops"}]"#,
        )
        .unwrap();
        let table = locations_table(&locations);
        assert_eq!(table.len(), 1);
        assert!(table.render().contains("Unknown Address"));
    }
}
