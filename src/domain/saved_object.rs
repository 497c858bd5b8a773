// Saved object domain model - the generic persisted entity of the object store
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const VISUALIZATION_REFERENCE: &str = "visualization";
pub const TAG_REFERENCE: &str = "tag";
pub const INDEX_PATTERN_REFERENCE: &str = "index-pattern";

/// Typed pointer from one saved object to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Reference {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
        }
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

/// A saved object of any type. Only `id`, `type`, `attributes` and
/// `references` are interpreted; the rest (versions, timestamps, namespaces)
/// rides along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SavedObject {
    pub fn new(kind: impl Into<String>, id: Option<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            attributes: Map::new(),
            references: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.attributes.get("title").and_then(Value::as_str)
    }
}

/// Parses an NDJSON export, one saved object per non-blank line.
pub fn parse_ndjson(export: &str) -> serde_json::Result<Vec<SavedObject>> {
    export
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(serde_json::from_str)
        .collect()
}

pub fn to_ndjson(objects: &[SavedObject]) -> serde_json::Result<String> {
    let lines = objects
        .iter()
        .map(serde_json::to_string)
        .collect::<serde_json::Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
}
