//! Load-once, query-many entity graph.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ragline_core::types::{Document, DocumentSource};
use ragline_utils::text::word_tokens;
use serde_json::json;

use crate::entity::{Entity, EntityFile};
use crate::error::Result;

/// A loaded entity graph, ready for scored lookup.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    entities: Vec<Entity>,
}

impl EntityGraph {
    /// Load entities from a JSON file shaped `{"entities": [...]}`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let file: EntityFile = serde_json::from_str(&raw)?;
        Ok(Self {
            entities: file.entities,
        })
    }

    /// An empty graph, used when no entity file is configured.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether any entities were loaded.
    #[must_use]
    pub fn available(&self) -> bool {
        !self.entities.is_empty()
    }

    fn score(entity: &Entity, tokens: &[String]) -> f64 {
        let name_lower = entity.name.to_lowercase();
        let description_lower = entity.description.to_lowercase();
        let tags_lower = entity.tags.join(" ").to_lowercase();

        let mut score = 0.0;
        for token in tokens {
            if name_lower.contains(token.as_str()) {
                score += 2.0;
            }
            if description_lower.contains(token.as_str()) {
                score += 1.0;
            }
            if tags_lower.contains(token.as_str()) {
                score += 1.5;
            }
        }
        score
    }

    /// Score every entity against `query`'s tokens and return the top
    /// `limit` as [`Document`]s, highest score first.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<Document> {
        let tokens = word_tokens(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &Entity)> = self
            .entities
            .iter()
            .map(|e| (Self::score(e, &tokens), e))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(limit)
            .map(|(score, entity)| {
                let mut metadata = HashMap::new();
                metadata.insert("entity".to_string(), json!(entity.name));
                metadata.insert("entity_type".to_string(), json!(entity.entity_type));
                metadata.insert("score".to_string(), json!(score));
                Document::new(
                    entity.serialize(),
                    DocumentSource::EntityGraph,
                    &format!("entity::{}", entity.name),
                )
                .with_metadata(metadata)
                .with_score(score)
            })
            .collect()
    }
}
