// Dashboard filter construction
use super::error::{DashboardError, DashboardResult};
use serde_json::{json, Value};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// `is` - field matches a single phrase
    Is,
    /// `one_of` - field matches any phrase of a list
    OneOf,
    /// `exist` - field is present
    Exist,
    /// `between` - field falls in a range, value holds `gte`/`lt`-style bounds
    Between,
}

impl FromStr for FilterKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "is" => Ok(FilterKind::Is),
            "one_of" => Ok(FilterKind::OneOf),
            "exist" => Ok(FilterKind::Exist),
            "between" => Ok(FilterKind::Between),
            other => Err(DashboardError::invalid(format!("invalid filter type {}", other))),
        }
    }
}

/// Everything needed to append one filter to a dashboard.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub key: String,
    pub kind: FilterKind,
    pub value: Value,
    pub index_pattern_id: String,
    pub negate: bool,
    pub disabled: bool,
    pub label: Option<String>,
}

impl FilterSpec {
    pub fn new(key: impl Into<String>, kind: FilterKind, value: impl Into<Value>, index_pattern_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            value: value.into(),
            index_pattern_id: index_pattern_id.into(),
            negate: false,
            disabled: false,
            label: None,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Reference name of the index pattern used by the filter at `position`.
pub fn index_ref_name(position: usize) -> String {
    format!("kibanaSavedObjectMeta.searchSourceJSON.filter[{}].meta.index", position)
}

/// Builds the filter object stored in `searchSourceJSON.filter` for a filter
/// that will sit at `position` in that list.
pub fn build_filter(spec: &FilterSpec, position: usize) -> DashboardResult<Value> {
    let key = spec.key.as_str();
    let mut filter = json!({
        "meta": {
            "field": key,
            "alias": spec.label,
            "negate": spec.negate,
            "disabled": spec.disabled,
            "key": key,
            "indexRefName": index_ref_name(position),
        },
        "$state": { "store": "appState" },
    });

    match spec.kind {
        FilterKind::Is => {
            let params = match &spec.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            filter["meta"]["type"] = json!("phrase");
            filter["meta"]["params"] = json!({ "query": params });
            filter["query"] = json!({ "match_phrase": { key: spec.value } });
        }
        FilterKind::OneOf => {
            let Value::Array(values) = &spec.value else {
                return Err(DashboardError::invalid(format!("one_of filter on {} needs a list of values", key)));
            };
            let should: Vec<Value> = values
                .iter()
                .map(|v| json!({ "match_phrase": { key: v } }))
                .collect();
            filter["meta"]["type"] = json!("phrases");
            filter["meta"]["params"] = spec.value.clone();
            filter["query"] = json!({
                "bool": { "should": should, "minimum_should_match": 1 }
            });
        }
        FilterKind::Exist => {
            filter["meta"]["type"] = json!("exists");
            filter["meta"]["value"] = json!("exists");
            filter["query"] = json!({ "exists": { "field": key } });
        }
        FilterKind::Between => {
            if !spec.value.is_object() {
                return Err(DashboardError::invalid(format!("between filter on {} needs range bounds", key)));
            }
            filter["meta"]["type"] = json!("range");
            filter["meta"]["params"] = spec.value.clone();
            filter["query"] = json!({ "range": { key: spec.value } });
        }
    }

    Ok(filter)
}
