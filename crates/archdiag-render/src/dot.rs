//! Graphviz DOT export.
//!
//! The output mirrors what the scene would look like as hand-written Graphviz source: default
//! graph/node/edge attributes, nested `subgraph cluster_*` blocks and one statement per edge.
//! Icons are carried as a `class` hint since no image files are referenced.

use archdiag_core::config::CLUSTER_BG_COLORS;
use archdiag_core::{Attrs, DiagramConfig, EdgeDirection, Scene};
use std::fmt::Write as _;

pub fn to_dot(scene: &Scene, config: &DiagramConfig) -> String {
    let mut graph_attr = config.effective_graph_attr();
    let title = if scene.title.trim().is_empty() {
        config.name.as_str()
    } else {
        scene.title.as_str()
    };
    graph_attr.set("label", title);
    graph_attr.set("labelloc", "b");

    let mut out = String::new();
    let _ = writeln!(&mut out, "digraph {} {{", quote(title));
    write_attr_stmt(&mut out, 1, "graph", &graph_attr);
    write_attr_stmt(&mut out, 1, "node", &config.effective_node_attr());
    write_attr_stmt(&mut out, 1, "edge", &config.effective_edge_attr());
    out.push('\n');

    write_members(&mut out, scene, None, 1);

    if !scene.edges.is_empty() {
        out.push('\n');
    }
    for edge in &scene.edges {
        let mut attrs = edge.attrs.clone();
        if let Some(label) = &edge.label {
            attrs.set("label", label.as_str());
        }
        if edge.direction != EdgeDirection::Forward {
            attrs.set("dir", edge.direction.as_str());
        }
        let _ = write!(&mut out, "    {} -> {}", quote(&edge.from), quote(&edge.to));
        write_attr_list(&mut out, &attrs);
        out.push_str(";\n");
    }
    out.push_str("}\n");
    out
}

fn write_members(out: &mut String, scene: &Scene, cluster: Option<&str>, depth: usize) {
    let indent = "    ".repeat(depth);
    for node in scene.child_nodes(cluster) {
        let mut attrs = Attrs::new();
        attrs.set("label", node.label.as_str());
        attrs.set("class", node.icon.qualified_name());
        attrs.extend_from(&node.attrs);
        let _ = write!(out, "{indent}{}", quote(&node.id));
        write_attr_list(out, &attrs);
        out.push_str(";\n");
    }
    for child in scene.child_clusters(cluster) {
        let level = scene.depth_of(&child.id);
        let mut attrs = DiagramConfig::default_cluster_attr();
        attrs.set("label", child.label.as_str());
        attrs.set("bgcolor", CLUSTER_BG_COLORS[level % CLUSTER_BG_COLORS.len()]);
        attrs.extend_from(&child.attrs);

        let _ = writeln!(out, "{indent}subgraph {} {{", quote(&subgraph_name(&child.id)));
        write_attr_stmt(out, depth + 1, "graph", &attrs);
        write_members(out, scene, Some(&child.id), depth + 1);
        let _ = writeln!(out, "{indent}}}");
    }
}

/// Graphviz only draws subgraphs whose name starts with `cluster` as boxes.
fn subgraph_name(id: &str) -> String {
    if id.starts_with("cluster") {
        id.to_string()
    } else {
        format!("cluster_{id}")
    }
}

fn write_attr_stmt(out: &mut String, depth: usize, kind: &str, attrs: &Attrs) {
    let _ = write!(out, "{}{kind}", "    ".repeat(depth));
    write_attr_list(out, attrs);
    out.push_str(";\n");
}

fn write_attr_list(out: &mut String, attrs: &Attrs) {
    if attrs.is_empty() {
        return;
    }
    out.push_str(" [");
    for (i, (k, v)) in attrs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{k}={}", quote(v));
    }
    out.push(']');
}

fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_escape_quotes_and_newlines() {
        assert_eq!(quote("a\n\"b\""), r#""a\n\"b\"""#);
    }

    #[test]
    fn subgraph_names_get_a_single_cluster_prefix() {
        assert_eq!(subgraph_name("cluster_0"), "cluster_0");
        assert_eq!(subgraph_name("vnet"), "cluster_vnet");
    }
}
