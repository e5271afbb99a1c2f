use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use textwrap::Options;

use crate::tables::{EntityRow, RelationshipRow};

/// Tooltip line width.
pub const WRAP_WIDTH: usize = 50;

/// Node identity: an entity's human-readable id, or the raw value found in a
/// relationship endpoint that matched no created entity node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum NodeId {
    Entity(i64),
    Raw(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Entity(id) => write!(f, "{}", id),
            NodeId::Raw(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(rename = "title")]
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    #[serde(rename = "from")]
    pub source: NodeId,
    #[serde(rename = "to")]
    pub target: NodeId,
    #[serde(rename = "title")]
    pub tooltip: String,
}

/// Nodes and edges in insertion order, with node ids kept unique.
#[derive(Debug, Clone, Default)]
pub struct VisGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    added_nodes: HashSet<NodeId>,
}

impl VisGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false, leaving the graph unchanged, when the id is already present.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if !self.added_nodes.insert(node.id.clone()) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.added_nodes.contains(id)
    }

    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Map a relationship endpoint to a node id, adding a minimal node when needed.
    fn endpoint(&mut self, raw: &str) -> NodeId {
        if let Ok(id) = raw.trim().parse::<i64>() {
            let entity = NodeId::Entity(id);
            if self.contains(&entity) {
                return entity;
            }
        }

        let id = NodeId::Raw(raw.to_string());
        self.add_node(GraphNode {
            id: id.clone(),
            label: raw.to_string(),
            group: None,
            tooltip: raw.to_string(),
        });
        id
    }
}

/// Word-wrap at [`WRAP_WIDTH`] and join with newlines. Runs of whitespace,
/// line breaks included, are collapsed to a single space before wrapping.
/// Words longer than the width are kept whole on their own line.
pub fn wrap_description(text: &str) -> String {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    textwrap::wrap(&flattened, Options::new(WRAP_WIDTH).break_words(false)).join("\n")
}

/// Build the graph for the referenced entities and relationships.
///
/// Rows are taken in table order. Every matched entity becomes a node keyed by
/// its human-readable id. Every matched relationship becomes an edge; an
/// endpoint that is not one of those entity nodes gets a minimal node labelled
/// with its raw value.
pub fn build_graph(
    entities: &[EntityRow],
    relationships: &[RelationshipRow],
    entity_ids: &[i64],
    relationship_ids: &[String],
) -> VisGraph {
    let wanted_entities: HashSet<i64> = entity_ids.iter().copied().collect();
    let wanted_relationships: HashSet<&str> = relationship_ids.iter().map(String::as_str).collect();

    let mut graph = VisGraph::new();

    for row in entities
        .iter()
        .filter(|row| wanted_entities.contains(&row.human_readable_id))
    {
        let description = wrap_description(&row.description);
        graph.add_node(GraphNode {
            id: NodeId::Entity(row.human_readable_id),
            label: row.name.clone(),
            group: Some(row.entity_type.clone()),
            tooltip: format!(
                "Name: {}\nType: {}\nDescription: {}",
                row.name, row.entity_type, description
            ),
        });
    }

    for row in relationships
        .iter()
        .filter(|row| wanted_relationships.contains(row.human_readable_id.as_str()))
    {
        let source = graph.endpoint(&row.source);
        let target = graph.endpoint(&row.target);
        graph.add_edge(GraphEdge {
            source,
            target,
            tooltip: wrap_description(&row.description),
        });
    }

    graph
}
