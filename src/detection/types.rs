//! Detection records and their rendered form.

use serde::{Deserialize, Serialize};

/// One object reported by the backend's detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Detection {
    /// Color label, e.g. "blue"
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub action_id: Option<u32>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// Swatch color in OpenCV channel order
    #[serde(default)]
    pub bgr: Option<[u8; 3]>,
    #[serde(default)]
    pub x: Option<i64>,
    #[serde(default)]
    pub y: Option<i64>,
    #[serde(default)]
    pub w: Option<i64>,
    #[serde(default)]
    pub h: Option<i64>,
}

impl Detection {
    /// Action to dispatch, if both the action id and duration are set and
    /// non-zero.
    pub fn action(&self) -> Option<(u32, u64)> {
        match (self.action_id, self.duration_ms) {
            (Some(action_id), Some(duration_ms)) if action_id > 0 && duration_ms > 0 => {
                Some((action_id, duration_ms))
            }
            _ => None,
        }
    }

    /// Fill a missing action id or duration from the built-in color table.
    ///
    /// Colors outside the table keep no action; a known color with a
    /// missing duration gets the table's duration.
    pub fn with_fallback(mut self) -> Self {
        if let Some((action_id, duration_ms)) = fallback_action(&self.name) {
            self.action_id = self.action_id.filter(|id| *id > 0).or(Some(action_id));
            self.duration_ms = self.duration_ms.filter(|d| *d > 0).or(Some(duration_ms));
        }
        self
    }
}

/// Client-side action table used when the backend does not attach actions.
pub fn fallback_action(color: &str) -> Option<(u32, u64)> {
    match color.to_lowercase().as_str() {
        "blue" => Some((1, 4000)),
        "green" => Some((2, 6000)),
        "red" => Some((3, 8000)),
        _ => None,
    }
}

/// Response of `GET /api/camera/detections`.
#[derive(Debug, Deserialize)]
pub(crate) struct DetectionsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// Display row for a detected object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionView {
    pub name: String,
    /// `rgb(r,g,b)` swatch, if the backend sent a color
    pub swatch: Option<String>,
    pub action_id: Option<u32>,
    pub duration_ms: Option<u64>,
    /// `(x,y) w×h`, if the backend sent geometry
    pub bounds: Option<String>,
}

impl From<&Detection> for DetectionView {
    fn from(detection: &Detection) -> Self {
        let name = if detection.name.is_empty() {
            "unknown".to_string()
        } else {
            detection.name.clone()
        };

        let bounds = match (detection.x, detection.y, detection.w, detection.h) {
            (None, None, None, None) => None,
            (x, y, w, h) => Some(format!(
                "({},{}) {}×{}",
                x.unwrap_or(0),
                y.unwrap_or(0),
                w.unwrap_or(0),
                h.unwrap_or(0)
            )),
        };

        Self {
            name,
            swatch: detection
                .bgr
                .map(|[b, g, r]| format!("rgb({},{},{})", r, g, b)),
            action_id: detection.action_id,
            duration_ms: detection.duration_ms,
            bounds,
        }
    }
}

/// Render the full detection list.
pub fn render(detections: &[Detection]) -> Vec<DetectionView> {
    detections.iter().map(DetectionView::from).collect()
}
