// Panel domain model - one entry of a dashboard's panelsJSON array
use super::error::{DashboardError, DashboardResult};
use super::grid::MAX_GRID_HEIGHT;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const PANEL_TYPE: &str = "visualization";

/// Position and size of a panel on the dashboard grid.
/// `i` repeats the panel id, the wrapped format requires both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridData {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
    pub i: String,
}

/// A placed panel as stored in `attributes.panelsJSON`:
///
/// ```json
/// {
///   "type": "visualization",
///   "gridData": { "x": 0, "y": 0, "w": 10, "h": 5, "i": "0bbd..." },
///   "panelIndex": "0bbd...",
///   "embeddableConfig": { "hidePanelTitles": false },
///   "title": "Some dashboard specific title",
///   "panelRefName": "panel_0bbd..."
/// }
/// ```
///
/// Keys the library does not interpret are kept in `extra` so a panel survives
/// a parse/encode round trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    #[serde(rename = "type", default = "default_panel_type")]
    pub kind: String,
    #[serde(rename = "gridData")]
    pub grid: GridData,
    #[serde(rename = "panelIndex")]
    pub panel_index: String,
    #[serde(rename = "embeddableConfig", default)]
    pub embeddable_config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "panelRefName", default, skip_serializing_if = "Option::is_none")]
    pub panel_ref_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_panel_type() -> String {
    PANEL_TYPE.to_string()
}

impl Panel {
    pub fn new(panel_id: &str, x: usize, y: usize, w: usize, h: usize, title: Option<String>) -> Self {
        Self {
            kind: default_panel_type(),
            grid: GridData {
                x,
                y,
                w,
                h,
                i: panel_id.to_string(),
            },
            panel_index: panel_id.to_string(),
            embeddable_config: json!({
                "enhancements": { "title": title },
                "hidePanelTitles": title.is_none(),
            }),
            title,
            panel_ref_name: Some(panel_ref_name(panel_id)),
            extra: Map::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.panel_index
    }

    /// Exclusive right edge
    pub fn x2(&self) -> usize {
        self.grid.x.saturating_add(self.grid.w)
    }

    /// Exclusive bottom edge
    pub fn y2(&self) -> usize {
        self.grid.y.saturating_add(self.grid.h)
    }

    /// Rejects panels whose edges overflow or whose bottom edge lies past
    /// [`MAX_GRID_HEIGHT`].
    pub fn check_bounds(&self) -> DashboardResult<()> {
        let GridData { x, y, w, h, .. } = self.grid;
        if x.checked_add(w).is_none() {
            return Err(DashboardError::invalid(format!("panel {} right edge overflows: x {} w {}", self.panel_index, x, w)));
        }
        match y.checked_add(h) {
            Some(y2) if y2 <= MAX_GRID_HEIGHT => Ok(()),
            _ => Err(DashboardError::invalid(format!(
                "panel {} bottom edge past row {}: y {} h {}",
                self.panel_index, MAX_GRID_HEIGHT, y, h
            ))),
        }
    }

    /// True when the panel carries `id` either as its index or in its grid data.
    pub fn has_id(&self, id: &str) -> bool {
        self.panel_index == id || self.grid.i == id
    }
}

pub fn panel_ref_name(panel_id: &str) -> String {
    format!("panel_{}", panel_id)
}

/// Reference name linking a panel to its visualization: `<id>:panel_<id>`.
pub fn panel_reference_name(panel_id: &str) -> String {
    format!("{}:{}", panel_id, panel_ref_name(panel_id))
}

/// Recovers the panel id from a reference name produced by [`panel_reference_name`].
/// Older documents only carry `panel_<id>`, which is accepted too.
pub fn panel_id_from_reference_name(name: &str) -> Option<&str> {
    let id = match name.split_once(":panel_") {
        Some((_, id)) => id,
        None => name.strip_prefix("panel_")?,
    };
    (!id.is_empty()).then_some(id)
}

pub fn parse_panels(panels_json: &str) -> serde_json::Result<Vec<Panel>> {
    if panels_json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(panels_json)
}

pub fn encode_panels(panels: &[Panel]) -> serde_json::Result<String> {
    serde_json::to_string(panels)
}
