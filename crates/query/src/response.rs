use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

use crate::tokenizer::GroupTokenizer;

/// Start of the usable part of the engine's query output.
pub const SUCCESS_MARKER: &str = "SUCCESS:";

static ENTITIES_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Entities\s*\((.*?)\)").unwrap());
static RELATIONSHIPS_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Relationships\s*\((.*?)\)").unwrap());

/// Engine stdout reduced to the text after the success marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineResponse {
    body: Option<String>,
}

impl EngineResponse {
    pub fn parse(raw: &str) -> Self {
        let body = raw
            .split_once(SUCCESS_MARKER)
            .map(|(_, rest)| rest.trim().to_string());
        Self { body }
    }

    pub fn is_success(&self) -> bool {
        self.body.is_some()
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// The marker followed by the trimmed body, or an empty string when the
    /// marker never appeared.
    pub fn filtered(&self) -> String {
        match &self.body {
            Some(body) => format!("{}{}", SUCCESS_MARKER, body),
            None => String::new(),
        }
    }
}

/// Shorthand for `EngineResponse::parse(raw).filtered()`.
pub fn filter_query_output(raw: &str) -> String {
    EngineResponse::parse(raw).filtered()
}

/// Entity and relationship ids cited in a response, in first-seen order.
/// Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct References {
    pub entities: Vec<i64>,
    pub relationships: Vec<String>,
}

impl References {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }
}

/// Collect ids from every `Entities(...)` and `Relationships(...)` group.
///
/// Entity tokens that are not integers are skipped. Relationship tokens are
/// kept as-is, empty ones included. In both kinds of group a `+`-prefixed
/// token ends that group, and a group with blank content adds nothing.
pub fn extract_references(text: &str) -> References {
    let mut references = References::default();

    for captures in ENTITIES_GROUP.captures_iter(text) {
        if captures[1].trim().is_empty() {
            continue;
        }
        for token in GroupTokenizer::new(&captures[1]) {
            match token.parse::<i64>() {
                Ok(id) => references.entities.push(id),
                Err(_) => debug!(token, "Skipping non-numeric entity reference"),
            }
        }
    }

    for captures in RELATIONSHIPS_GROUP.captures_iter(text) {
        if captures[1].trim().is_empty() {
            continue;
        }
        references
            .relationships
            .extend(GroupTokenizer::new(&captures[1]).map(str::to_string));
    }

    references
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keeps_text_after_marker() {
        let raw = "INFO: loading index\nINFO: running\nSUCCESS: Local Search Response:\n\n  Solana uses PoH.  \n";

        assert_eq!(
            filter_query_output(raw),
            "SUCCESS:Local Search Response:\n\n  Solana uses PoH."
        );
    }

    #[test]
    fn test_filter_uses_first_marker() {
        assert_eq!(filter_query_output("SUCCESS: a SUCCESS: b"), "SUCCESS:a SUCCESS: b");
    }

    #[test]
    fn test_missing_marker_is_empty() {
        let response = EngineResponse::parse("Traceback (most recent call last): ...");

        assert!(!response.is_success());
        assert_eq!(response.body(), None);
        assert_eq!(response.filtered(), "");
        assert!(extract_references(&response.filtered()).is_empty());
    }

    #[test]
    fn test_entities_stop_at_continuation() {
        let refs = extract_references("[Data: Entities(1, 2, +x, 3)]");
        assert_eq!(refs.entities, vec![1, 2]);
    }

    #[test]
    fn test_entities_skip_non_numeric() {
        let refs = extract_references("[Data: Entities(a, 2, 3)]");
        assert_eq!(refs.entities, vec![2, 3]);
    }

    #[test]
    fn test_relationships_stop_at_continuation() {
        let refs = extract_references("[Data: Relationships(foo, +bar, baz)]");
        assert_eq!(refs.relationships, vec!["foo"]);
    }

    #[test]
    fn test_multiple_groups_keep_order_and_duplicates() {
        let text = "SUCCESS:Solana [Data: Entities (5, 7, +more); Relationships (12, 3)].\n\
                    Validators [Data: Entities(7, 1); Relationships(3)].";

        let refs = extract_references(text);
        assert_eq!(refs.entities, vec![5, 7, 7, 1]);
        assert_eq!(refs.relationships, vec!["12", "3", "3"]);
    }

    #[test]
    fn test_truncation_is_per_group() {
        let refs = extract_references("Entities(1, +2) and Entities(3, 4)");
        assert_eq!(refs.entities, vec![1, 3, 4]);
    }

    #[test]
    fn test_empty_group_adds_nothing() {
        let refs = extract_references("Entities() Relationships(  )");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_empty_relationship_tokens_are_kept() {
        let refs = extract_references("Relationships(a,,b) Relationships(c, )");
        assert_eq!(refs.relationships, vec!["a", "", "b", "c", ""]);
    }

    #[test]
    fn test_empty_entity_tokens_are_skipped() {
        let refs = extract_references("Entities(1,,2, )");
        assert_eq!(refs.entities, vec![1, 2]);
    }

    #[test]
    fn test_group_does_not_span_lines() {
        let refs = extract_references("Entities(1,\n2)");
        assert!(refs.entities.is_empty());
    }
}
