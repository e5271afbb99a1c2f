use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::error::VisualizeError;
use crate::graph::VisGraph;

const VIS_NETWORK_SCRIPT: &str =
    "https://unpkg.com/vis-network@9.1.2/standalone/umd/vis-network.min.js";

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Query graph</title>
<script type="text/javascript" src="__VIS_NETWORK__"></script>
<style type="text/css">
  body { margin: 0; font-family: sans-serif; }
  #graph {
    width: 100%;
    height: 750px;
    background-color: #ffffff;
    border: 1px solid lightgray;
    position: relative;
  }
  div.vis-tooltip { white-space: pre-wrap; max-width: 420px; }
</style>
</head>
<body>
<div id="graph"></div>
<script type="text/javascript">
  var nodes = new vis.DataSet(__NODES__);
  var edges = new vis.DataSet(__EDGES__);
  var container = document.getElementById("graph");
  var options = {
    nodes: { shape: "dot", size: 16, font: { size: 14 } },
    edges: { arrows: { to: { enabled: true } }, smooth: { type: "dynamic" } },
    interaction: { hover: true, tooltipDelay: 100, navigationButtons: true },
    physics: { stabilization: { iterations: 200 } }
  };
  var network = new vis.Network(container, { nodes: nodes, edges: edges }, options);
</script>
</body>
</html>
"#;

/// Render the graph as a single HTML document.
///
/// Output depends only on the graph contents and their insertion order.
pub fn render_html(graph: &VisGraph) -> Result<String, VisualizeError> {
    let nodes = script_json(graph.nodes())?;
    let edges = script_json(graph.edges())?;

    Ok(TEMPLATE
        .replace("__VIS_NETWORK__", VIS_NETWORK_SCRIPT)
        .replace("__NODES__", &nodes)
        .replace("__EDGES__", &edges))
}

/// Write the rendered graph to `path`, replacing any previous artifact.
pub fn write_artifact(graph: &VisGraph, path: &Path) -> Result<(), VisualizeError> {
    let html = render_html(graph)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| VisualizeError::WriteArtifact {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, html).map_err(|source| VisualizeError::WriteArtifact {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        path = ?path,
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        "Wrote graph visualization"
    );
    Ok(())
}

/// JSON safe to embed inside a `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, VisualizeError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}
