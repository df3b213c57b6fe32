//! Export of an authored graph to narrative script source.
//!
//! Every node becomes a knot named after its id. Hubs and choice nodes list
//! their outgoing edges as sticky options; every other node diverts to its
//! resolved successor, or ends the flow.

use std::fmt::Write;

use crate::graph::StoryGraph;
use crate::node::{Edge, StoryNode};

/// Render the whole graph as narrative script source.
pub fn export_narrative_source(graph: &StoryGraph) -> String {
    let mut source = String::new();
    for node in graph.nodes() {
        write_knot(&mut source, graph, node);
    }
    source
}

fn write_knot(out: &mut String, graph: &StoryGraph, node: &StoryNode) {
    let _ = writeln!(out, "=== {} ===", node.id);
    if node.is_hub() {
        out.push_str("# hub\n");
    }
    let _ = writeln!(out, "{}", node.raw_text.trim_end());

    if node.is_hub() || node.is_choice() {
        let mut wrote_option = false;
        for edge in graph.outgoing(node.id.as_str()) {
            if let Some(target) = graph.node(edge.target.as_str()) {
                let _ = writeln!(out, "+ [{}] -> {}", option_label(edge, target), target.id);
                wrote_option = true;
            }
        }
        if !wrote_option {
            out.push_str("-> DONE\n");
        }
    } else {
        match graph
            .successor(node.id.as_str())
            .filter(|e| graph.contains(e.target.as_str()))
        {
            Some(edge) => {
                let _ = writeln!(out, "-> {}", edge.target);
            }
            None => out.push_str("-> DONE\n"),
        }
    }

    out.push('\n');
}

fn option_label<'a>(edge: &'a Edge, target: &'a StoryNode) -> &'a str {
    edge.display_label()
        .or_else(|| Some(target.label.as_str()).filter(|l| !l.trim().is_empty()))
        .unwrap_or(target.id.as_str())
}
