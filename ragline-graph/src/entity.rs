//! Entity record and its serialized "card" form.

use serde::{Deserialize, Serialize};

/// One named entity in the static graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Entity name, as referenced by queries.
    pub name: String,
    /// Entity type/category (free-form).
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Documents this entity is discussed in.
    #[serde(default)]
    pub documents: Vec<String>,
    /// Entities this one depends on.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Entities this one feeds into.
    #[serde(default)]
    pub feeds: Vec<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Entity {
    /// Render this entity as the card-style text used as a [`Document`]'s
    /// content when returned from a search.
    ///
    /// [`Document`]: ragline_core::types::Document
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = format!("# Entity: {} ({})\n", self.name, self.entity_type);
        if !self.description.is_empty() {
            out.push_str(&format!("{}\n", self.description));
        }
        if !self.depends_on.is_empty() {
            out.push_str(&format!("Depends on: {}\n", self.depends_on.join(", ")));
        }
        if !self.feeds.is_empty() {
            out.push_str(&format!("Feeds: {}\n", self.feeds.join(", ")));
        }
        if !self.documents.is_empty() {
            out.push_str(&format!("Documents: {}\n", self.documents.join(", ")));
        }
        if !self.tags.is_empty() {
            out.push_str(&format!("Tags: {}\n", self.tags.join(", ")));
        }
        out
    }
}

/// The top-level shape of the entity graph's JSON file: `{"entities": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityFile {
    /// The entities in the graph.
    pub entities: Vec<Entity>,
}
