//! Two acceptance paths for a memory service's stdout: structured JSON, or
//! a regex fallback over quoted observations longer than 100 chars.

use std::collections::HashMap;
use std::sync::LazyLock;

use ragline_core::types::{Document, DocumentSource};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RawObservation {
    content: String,
    #[serde(default)]
    metadata: HashMap<String, Value>,
}

/// Try to parse `stdout` as a JSON array of `{content, metadata?}` objects.
#[must_use]
pub fn parse_json(stdout: &str) -> Option<Vec<Document>> {
    let raw: Vec<RawObservation> = serde_json::from_str(stdout).ok()?;
    Some(
        raw.into_iter()
            .map(|obs| {
                Document::new(obs.content.clone(), DocumentSource::Memory, &obs.content)
                    .with_metadata(obs.metadata)
            })
            .collect(),
    )
}

static QUOTED_OBSERVATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"\\]{100,})""#).expect("valid regex"));

/// Fall back to extracting quoted strings longer than 100 characters from
/// possibly-truncated JSON, treating each as an observation with no
/// metadata.
#[must_use]
pub fn parse_fallback(stdout: &str) -> Vec<Document> {
    QUOTED_OBSERVATION
        .captures_iter(stdout)
        .filter_map(|cap| cap.get(1))
        .map(|m| {
            let content = m.as_str().to_string();
            Document::new(content.clone(), DocumentSource::Memory, &content)
        })
        .collect()
}

/// Parse stdout, preferring well-formed JSON and falling back to the
/// quoted-string heuristic when the JSON is truncated or otherwise invalid.
#[must_use]
pub fn parse_memory_output(stdout: &str) -> Vec<Document> {
    parse_json(stdout).unwrap_or_else(|| parse_fallback(stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_json() {
        let stdout = r#"[{"content": "doc one", "metadata": {"entity": "x"}}]"#;
        let docs = parse_memory_output(stdout);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "doc one");
        assert_eq!(docs[0].metadata["entity"], "x");
    }

    #[test]
    fn falls_back_on_truncated_json() {
        let long = "y".repeat(150);
        let stdout = format!(r#"[{{"content": "{long}", "meta"#);
        let docs = parse_memory_output(&stdout);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, long);
    }

    #[test]
    fn fallback_ignores_short_quoted_strings() {
        let stdout = r#"[{"content": "short", "broken": tr"#;
        let docs = parse_memory_output(stdout);
        assert!(docs.is_empty());
    }
}
