use serde::{Deserialize, Serialize};

/// How relationship labels are written into the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelQuoting {
    /// Wrapped in double quotes as-is. A label containing `"` yields a malformed query.
    #[default]
    Verbatim,
    /// Backslashes and double quotes are escaped inside the literal.
    Escaped,
}

impl LabelQuoting {
    fn quote(&self, label: &str) -> String {
        match self {
            LabelQuoting::Verbatim => format!("\"{}\"", label),
            LabelQuoting::Escaped => {
                format!("\"{}\"", label.replace('\\', "\\\\").replace('"', "\\\""))
            }
        }
    }
}

/// Read-only Cypher returning the referenced entity nodes, unioned with the
/// referenced relationships and their endpoints.
pub fn build_cypher_query(entities: &[i64], relationships: &[String], quoting: LabelQuoting) -> String {
    let entity_list = entities
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let relationship_list = relationships
        .iter()
        .map(|label| quoting.quote(label))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"MATCH (e:__Entity__)
WHERE e.human_readable_id IN [{}]
RETURN e AS source, NULL AS rel, NULL AS target

UNION

MATCH (source)-[r:RELATED]->(target)
WHERE r.human_readable_id IN [{}]
RETURN source, r AS rel, target
"#,
        entity_list, relationship_list
    )
}
