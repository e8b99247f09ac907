//! Output formatting helpers for CLI commands

use crate::broker::LogEntry;
use crate::camera::CameraInfo;
use crate::colors::ColorRule;
use crate::conveyor::ReadinessStatus;
use crate::detection::DetectionView;
use crate::panel::PanelSnapshot;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::json;
use std::fmt::Write;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

/// Pretty JSON under a single top-level key.
pub fn format_json<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ key: value }))
}

/// Colored readiness label.
pub fn readiness_label(status: ReadinessStatus) -> String {
    match status {
        ReadinessStatus::Ready => status.label().green().to_string(),
        ReadinessStatus::Done => status.label().cyan().to_string(),
        ReadinessStatus::Pinging => status.label().yellow().to_string(),
        ReadinessStatus::Timeout | ReadinessStatus::Error => status.label().red().to_string(),
        ReadinessStatus::Idle => status.label().dimmed().to_string(),
    }
}

/// Format color rules as a table
pub fn format_colors_table(rules: &[ColorRule]) -> String {
    if rules.is_empty() {
        return "No Colors".to_string();
    }

    let mut table = new_table(vec!["#", "Color", "Action", "Duration"]);
    for (i, rule) in rules.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i),
            Cell::new(rule.name),
            Cell::new(rule.action_id),
            Cell::new(format!("{}ms", rule.duration_ms)),
        ]);
    }
    table.to_string()
}

/// Format detections as a table
pub fn format_detections_table(detections: &[DetectionView]) -> String {
    if detections.is_empty() {
        return "No objects detected".to_string();
    }

    let mut table = new_table(vec!["Object", "Color", "Action", "Duration", "Bounds"]);
    for d in detections {
        table.add_row(vec![
            Cell::new(&d.name),
            Cell::new(d.swatch.as_deref().unwrap_or("-")),
            Cell::new(d.action_id.map_or("-".to_string(), |id| id.to_string())),
            Cell::new(d.duration_ms.map_or("-".to_string(), |ms| format!("{}ms", ms))),
            Cell::new(d.bounds.as_deref().unwrap_or("-")),
        ]);
    }
    table.to_string()
}

/// Format capture devices as a table
pub fn format_cameras_table(cameras: &[CameraInfo]) -> String {
    if cameras.is_empty() {
        return "No cameras found".to_string();
    }

    let mut table = new_table(vec!["Index", "Name"]);
    for c in cameras {
        table.add_row(vec![Cell::new(c.index), Cell::new(&c.name)]);
    }
    table.to_string()
}

/// Conveyor feed row for `status --feeds`.
#[derive(Debug, Clone, Serialize)]
pub struct FeedView {
    pub conveyor: String,
    pub topic: String,
    pub last_message: Option<String>,
}

/// Format conveyor feeds as a table
pub fn format_feeds_table(feeds: &[FeedView]) -> String {
    let mut table = new_table(vec!["Conveyor", "Status Topic", "Last Message"]);
    for f in feeds {
        table.add_row(vec![
            Cell::new(&f.conveyor),
            Cell::new(&f.topic),
            Cell::new(f.last_message.as_deref().unwrap_or("-")),
        ]);
    }
    table.to_string()
}

/// Format conveyor readiness as a table
pub fn format_readiness_table(conveyors: &[(String, ReadinessStatus)]) -> String {
    let mut table = new_table(vec!["Conveyor", "Status"]);
    for (id, status) in conveyors {
        table.add_row(vec![Cell::new(id), Cell::new(readiness_label(*status))]);
    }
    table.to_string()
}

/// Activity log lines, newest first.
pub fn format_activity(entries: &[LogEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Operator view of the panel, with at most `activity_limit` log lines.
pub fn format_snapshot(snapshot: &PanelSnapshot, activity_limit: usize) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Broker:   {}", snapshot.broker.render());
    match &snapshot.stream_url {
        Some(url) => {
            let _ = writeln!(output, "Camera:   {} ({})", snapshot.camera.render(), url);
        }
        None => {
            let _ = writeln!(output, "Camera:   {}", snapshot.camera.render());
        }
    }
    if !snapshot.view.is_identity() {
        let _ = writeln!(output, "View:     {}", snapshot.view);
    }
    let _ = writeln!(
        output,
        "Conveyor: {}",
        snapshot
            .selected_conveyor
            .as_deref()
            .unwrap_or("none (actions disabled)")
    );
    let _ = writeln!(
        output,
        "Polling:  {}",
        if snapshot.polling { "on" } else { "paused" }
    );

    if !snapshot.conveyors.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "{}", format_readiness_table(&snapshot.conveyors));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "{}", format_detections_table(&snapshot.detections));

    let recent: Vec<_> = snapshot
        .activity
        .iter()
        .take(activity_limit)
        .cloned()
        .collect();
    if !recent.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Activity:");
        let _ = writeln!(output, "{}", format_activity(&recent));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::ColorName;

    #[test]
    fn test_colors_table_contains_rows() {
        let rules = vec![ColorRule {
            name: ColorName::Blue,
            action_id: 1,
            duration_ms: 4000,
        }];
        let output = format_colors_table(&rules);
        assert!(output.contains("blue"));
        assert!(output.contains("4000ms"));
    }

    #[test]
    fn test_empty_tables_use_placeholders() {
        assert_eq!(format_colors_table(&[]), "No Colors");
        assert_eq!(format_detections_table(&[]), "No objects detected");
        assert_eq!(format_cameras_table(&[]), "No cameras found");
    }

    #[test]
    fn test_detections_table_shows_missing_fields() {
        let view = DetectionView {
            name: "green".to_string(),
            swatch: Some("rgb(0,255,0)".to_string()),
            action_id: None,
            duration_ms: None,
            bounds: None,
        };
        let output = format_detections_table(&[view]);
        assert!(output.contains("green"));
        assert!(output.contains("rgb(0,255,0)"));
    }

    #[test]
    fn test_format_json_wraps_key() {
        let output = format_json("cameras", &[CameraInfo {
            index: 0,
            name: "USB Camera".to_string(),
        }])
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["cameras"][0]["name"], "USB Camera");
    }

    #[test]
    fn test_snapshot_without_selection() {
        let snapshot = PanelSnapshot {
            broker: crate::indicator::Indicator::broker(false),
            camera: crate::indicator::Indicator::camera_stopped(),
            stream_url: None,
            view: Default::default(),
            selected_conveyor: None,
            conveyors: vec![("c1".to_string(), ReadinessStatus::Ready)],
            detections: vec![],
            activity: vec![],
            polling: false,
        };
        let output = format_snapshot(&snapshot, 5);

        assert!(output.contains("MQTT Offline"));
        assert!(output.contains("Camera Stopped"));
        assert!(output.contains("none (actions disabled)"));
        assert!(output.contains("No objects detected"));
        assert!(output.contains("c1"));
        assert!(!output.contains("Activity:"));
    }

    #[test]
    fn test_readiness_label_text() {
        assert!(readiness_label(ReadinessStatus::Timeout).contains("TIMEOUT"));
        assert!(readiness_label(ReadinessStatus::Pinging).contains("PING..."));
    }
}
