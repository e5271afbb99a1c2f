pub mod error;
pub mod graph;
pub mod html;
pub mod tables;

pub use error::VisualizeError;
pub use graph::{GraphEdge, GraphNode, NodeId, VisGraph, build_graph, wrap_description};
pub use html::{render_html, write_artifact};
pub use tables::{EntityRow, RelationshipRow, load_entities, load_relationships};

use std::path::Path;

/// Load the engine tables of a working directory, build the graph for the
/// referenced ids and write it to `artifact_path`.
///
/// A missing or unreadable table fails the whole call; an empty selection
/// still writes an (empty) artifact.
pub fn generate_query_visualization(
    entity_ids: &[i64],
    relationship_ids: &[String],
    working_directory: &Path,
    artifact_path: &Path,
) -> Result<VisGraph, VisualizeError> {
    let output_dir = working_directory.join(project::OUTPUT_DIR);

    let entities = load_entities(&output_dir)?;
    let relationships = load_relationships(&output_dir)?;

    let graph = build_graph(&entities, &relationships, entity_ids, relationship_ids);
    write_artifact(&graph, artifact_path)?;

    Ok(graph)
}
