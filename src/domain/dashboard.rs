// Dashboard domain model - a dashboard saved object and its editing operations
use super::error::{DashboardError, DashboardResult};
use super::filter::{build_filter, index_ref_name, FilterSpec};
use super::grid::GridMatrix;
use super::panel::{encode_panels, panel_id_from_reference_name, panel_reference_name, parse_panels, Panel};
use super::placement::{find_coordinates, ScanPolicy};
use super::saved_object::{Reference, SavedObject, INDEX_PATTERN_REFERENCE, TAG_REFERENCE, VISUALIZATION_REFERENCE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

pub const DASHBOARD_TYPE: &str = "dashboard";

const EMPTY_SEARCH_SOURCE: &str = r#"{"query":{"query":"","language":"kuery"},"filter":[]}"#;

/// A dashboard saved object:
///
/// ```json
/// {
///   "id": "a6be78a0-cf4f-11ed-b514-dddd0f14c058",
///   "type": "dashboard",
///   "attributes": {
///     "title": "test",
///     "panelsJSON": "[]",
///     "kibanaSavedObjectMeta": {
///       "searchSourceJSON": "{\"query\":{\"query\":\"\",\"language\":\"kuery\"},\"filter\":[]}"
///     },
///     "optionsJSON": "{\"useMargins\":true}",
///     "timeRestore": false
///   },
///   "references": [],
///   "version": "WzMwOSwxXQ=="
/// }
/// ```
///
/// `panelsJSON` and `searchSourceJSON` are JSON documents encoded as strings.
/// They stay strings here and are parsed on every read so the document can be
/// handed back to the store exactly as it came, plus the edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default = "dashboard_type")]
    pub kind: String,
    pub attributes: DashboardAttributes,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardAttributes {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "panelsJSON", default = "empty_panels_json")]
    pub panels_json: String,
    #[serde(rename = "kibanaSavedObjectMeta", default, skip_serializing_if = "Option::is_none")]
    pub saved_object_meta: Option<SavedObjectMeta>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedObjectMeta {
    #[serde(rename = "searchSourceJSON", default, skip_serializing_if = "Option::is_none")]
    pub search_source_json: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn dashboard_type() -> String {
    DASHBOARD_TYPE.to_string()
}

fn empty_panels_json() -> String {
    "[]".to_string()
}

/// A panel waiting to be placed. Without `panel_id` a random UUID is used.
#[derive(Debug, Clone)]
pub struct NewPanel {
    pub w: usize,
    pub h: usize,
    pub reference_id: String,
    pub title: Option<String>,
    pub panel_id: Option<String>,
}

impl NewPanel {
    pub fn new(w: usize, h: usize, reference_id: impl Into<String>) -> Self {
        Self {
            w,
            h,
            reference_id: reference_id.into(),
            title: None,
            panel_id: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_panel_id(mut self, panel_id: impl Into<String>) -> Self {
        self.panel_id = Some(panel_id.into());
        self
    }
}

impl Dashboard {
    /// An empty dashboard ready to be created in the store.
    pub fn new(title: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("description".to_string(), json!(""));
        extra.insert("optionsJSON".to_string(), json!("{}"));
        extra.insert("timeRestore".to_string(), json!(false));

        Self {
            id: None,
            kind: dashboard_type(),
            attributes: DashboardAttributes {
                title: title.into(),
                panels_json: empty_panels_json(),
                saved_object_meta: Some(SavedObjectMeta {
                    search_source_json: Some(EMPTY_SEARCH_SOURCE.to_string()),
                    extra: Map::new(),
                }),
                extra,
            },
            references: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn to_saved_object(&self) -> DashboardResult<SavedObject> {
        serde_json::to_value(self)
            .and_then(serde_json::from_value)
            .map_err(DashboardError::malformed("dashboard"))
    }

    /// Parses `panelsJSON`, rejecting panels that do not fit the grid.
    pub fn panels(&self) -> DashboardResult<Vec<Panel>> {
        let panels = parse_panels(&self.attributes.panels_json).map_err(DashboardError::malformed("panelsJSON"))?;
        for panel in &panels {
            panel.check_bounds()?;
        }
        Ok(panels)
    }

    fn set_panels(&mut self, panels: &[Panel]) -> DashboardResult<()> {
        self.attributes.panels_json = encode_panels(panels).map_err(DashboardError::malformed("panelsJSON"))?;
        Ok(())
    }

    pub fn matrix(&self) -> DashboardResult<GridMatrix> {
        Ok(GridMatrix::build(&self.panels()?))
    }

    /// True when no two panels overlap. Never checked implicitly.
    pub fn is_valid(&self) -> DashboardResult<bool> {
        Ok(self.matrix()?.is_valid())
    }

    pub fn empty_spaces(&self) -> DashboardResult<usize> {
        Ok(self.matrix()?.empty_space_count())
    }

    pub fn available_coordinates(&self, w: usize, h: usize, policy: ScanPolicy) -> DashboardResult<(usize, usize)> {
        Ok(find_coordinates(&self.matrix()?, w, h, policy))
    }

    // ---- panels ----

    /// Places a panel at `(x, y)` and links it to its visualization.
    ///
    /// Returns `Ok(None)` without touching the document when the panel id is
    /// already in use. Overlap with existing panels is not checked; use
    /// [`Dashboard::add_panel`] for that.
    pub fn insert_panel_at(&mut self, x: usize, y: usize, new_panel: &NewPanel) -> DashboardResult<Option<Panel>> {
        if new_panel.w == 0 || new_panel.h == 0 {
            return Err(DashboardError::invalid(format!(
                "panel size must be positive, got {}x{}",
                new_panel.w, new_panel.h
            )));
        }

        let mut panels = self.panels()?;
        let panel_id = new_panel
            .panel_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if panels.iter().any(|p| p.has_id(&panel_id)) {
            tracing::debug!("panel {} already on dashboard, skipping", panel_id);
            return Ok(None);
        }

        let panel = Panel::new(&panel_id, x, y, new_panel.w, new_panel.h, new_panel.title.clone());
        panel.check_bounds()?;
        panels.push(panel.clone());
        self.set_panels(&panels)?;

        self.references.push(Reference::new(
            new_panel.reference_id.clone(),
            panel_reference_name(&panel_id),
            VISUALIZATION_REFERENCE,
        ));

        tracing::debug!(
            "placed panel {} for {} at ({}, {}) size {}x{}",
            panel_id, new_panel.reference_id, x, y, new_panel.w, new_panel.h
        );
        Ok(Some(panel))
    }

    /// Places a panel on the first free spot found from the `policy` corner.
    /// Dashboards built only through this method never contain overlaps.
    pub fn add_panel(&mut self, new_panel: &NewPanel, policy: ScanPolicy) -> DashboardResult<Option<Panel>> {
        let (x, y) = self.available_coordinates(new_panel.w, new_panel.h, policy)?;
        self.insert_panel_at(x, y, new_panel)
    }

    /// Removes the first visualization reference pointing at `reference_id`
    /// together with the panel it names. Fails with `NotFound` when the
    /// dashboard has no such reference.
    pub fn remove_panel(&mut self, reference_id: &str) -> DashboardResult<Reference> {
        let position = self
            .references
            .iter()
            .position(|r| r.id == reference_id && r.is_kind(VISUALIZATION_REFERENCE))
            .ok_or_else(|| DashboardError::NotFound {
                kind: "visualization reference",
                id: reference_id.to_string(),
            })?;

        let panel_id = panel_id_from_reference_name(&self.references[position].name)
            .ok_or_else(|| DashboardError::NotFound {
                kind: "panel id in reference",
                id: self.references[position].name.clone(),
            })?
            .to_string();

        let mut panels = self.panels()?;
        let before = panels.len();
        panels.retain(|p| !p.has_id(&panel_id));
        if panels.len() == before {
            tracing::warn!("reference {} named missing panel {}", reference_id, panel_id);
        }

        self.set_panels(&panels)?;
        let reference = self.references.remove(position);

        tracing::debug!("removed panel {} for {}", panel_id, reference_id);
        Ok(reference)
    }

    // ---- filters ----

    fn search_source(&self) -> DashboardResult<Value> {
        let raw = self
            .attributes
            .saved_object_meta
            .as_ref()
            .and_then(|meta| meta.search_source_json.as_deref())
            .unwrap_or(EMPTY_SEARCH_SOURCE);
        serde_json::from_str(raw).map_err(DashboardError::malformed("searchSourceJSON"))
    }

    pub fn filters(&self) -> DashboardResult<Vec<Value>> {
        let search_source = self.search_source()?;
        Ok(search_source
            .get("filter")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Appends a filter and the reference to its index pattern.
    ///
    /// The reference name embeds the filter's position in the list, so filters
    /// must not be reordered or removed behind this method's back.
    pub fn append_filter(&mut self, spec: &FilterSpec) -> DashboardResult<()> {
        let mut search_source = self.search_source()?;
        let Some(source) = search_source.as_object_mut() else {
            return Err(DashboardError::invalid("searchSourceJSON is not an object"));
        };

        let filters = source.entry("filter").or_insert(Value::Null);
        if filters.is_null() {
            *filters = json!([]);
        }
        let Some(filters) = filters.as_array_mut() else {
            return Err(DashboardError::invalid("searchSourceJSON filter is not a list"));
        };

        let position = filters.len();
        filters.push(build_filter(spec, position)?);

        let encoded = serde_json::to_string(&search_source).map_err(DashboardError::malformed("searchSourceJSON"))?;
        self.attributes
            .saved_object_meta
            .get_or_insert_with(SavedObjectMeta::default)
            .search_source_json = Some(encoded);

        self.references.push(Reference::new(
            spec.index_pattern_id.clone(),
            index_ref_name(position),
            INDEX_PATTERN_REFERENCE,
        ));

        tracing::debug!("appended filter {} on {} at {}", spec.index_pattern_id, spec.key, position);
        Ok(())
    }

    // ---- tags ----

    pub fn tag_ids(&self) -> Vec<&str> {
        self.references
            .iter()
            .filter(|r| r.is_kind(TAG_REFERENCE))
            .map(|r| r.id.as_str())
            .collect()
    }

    /// Returns `false` when the tag was already attached.
    pub fn add_tag(&mut self, tag_id: &str) -> bool {
        if self.references.iter().any(|r| r.id == tag_id && r.is_kind(TAG_REFERENCE)) {
            return false;
        }
        self.references
            .push(Reference::new(tag_id, format!("tag-{}", tag_id), TAG_REFERENCE));
        true
    }

    /// Returns `true` when a tag was detached.
    pub fn remove_tag(&mut self, tag_id: &str) -> bool {
        let before = self.references.len();
        self.references
            .retain(|r| !(r.id == tag_id && r.is_kind(TAG_REFERENCE)));
        self.references.len() != before
    }

    /// Detaches every tag, returning how many were removed.
    pub fn remove_all_tags(&mut self) -> usize {
        let before = self.references.len();
        self.references.retain(|r| !r.is_kind(TAG_REFERENCE));
        before - self.references.len()
    }
}

impl TryFrom<SavedObject> for Dashboard {
    type Error = DashboardError;

    fn try_from(object: SavedObject) -> Result<Self, Self::Error> {
        if object.kind != DASHBOARD_TYPE {
            return Err(DashboardError::invalid(format!(
                "expected a {} saved object, got {}",
                DASHBOARD_TYPE, object.kind
            )));
        }
        serde_json::to_value(object)
            .and_then(serde_json::from_value)
            .map_err(DashboardError::malformed("dashboard"))
    }
}
