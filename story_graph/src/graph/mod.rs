//! Story Graph - the editable node/edge structure behind the story editor.

mod validate;

pub use validate::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::node::{Edge, HubConfig, NodeId, StoryNode};

/// Errors from graph edit operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("node '{0}' already exists")]
    DuplicateNode(NodeId),

    #[error("node '{0}' not found")]
    NodeNotFound(NodeId),
}

/// The authored story: nodes in list order plus the edges between them.
///
/// Edits made through this API keep ids unique and edges attached to real
/// nodes. A graph deserialized from disk may violate either; readers fall
/// back to the first matching node and [`StoryGraph::validate`] reports the
/// problems.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryGraph {
    #[serde(default)]
    nodes: Vec<StoryNode>,

    #[serde(default)]
    edges: Vec<Edge>,
}

impl StoryGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from raw parts without any checks.
    pub fn from_parts(nodes: Vec<StoryNode>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[StoryNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the first node with this id.
    pub fn node(&self, id: &str) -> Option<&StoryNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Get mutable node by id.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut StoryNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Add a node. Ids must be unique.
    pub fn add_node(&mut self, node: StoryNode) -> Result<(), GraphError> {
        if self.contains(node.id.as_str()) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Remove a node together with every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<StoryNode> {
        let pos = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(pos);
        self.edges.retain(|e| !e.touches(id));
        Some(node)
    }

    /// Rename a node, rewriting every edge endpoint and burn rule that
    /// references the old id. Either everything is rewritten or nothing is.
    pub fn rename_node(&mut self, old: &str, new: impl Into<NodeId>) -> Result<(), GraphError> {
        let new = new.into();
        if !self.contains(old) {
            return Err(GraphError::NodeNotFound(NodeId::new(old)));
        }
        if new == old {
            return Ok(());
        }
        if self.contains(new.as_str()) {
            return Err(GraphError::DuplicateNode(new));
        }

        for node in self.nodes.iter_mut() {
            if node.id == old {
                node.id = new.clone();
            }
            for rule in node.burn_rules.iter_mut() {
                if rule.target == old {
                    rule.target = new.clone();
                }
                for burned in rule.burns.iter_mut() {
                    if *burned == old {
                        *burned = new.clone();
                    }
                }
            }
        }

        for edge in self.edges.iter_mut() {
            if edge.source == old {
                edge.source = new.clone();
            }
            if edge.target == old {
                edge.target = new.clone();
            }
        }

        Ok(())
    }

    /// Connect two existing nodes.
    pub fn connect(&mut self, edge: Edge) -> Result<(), GraphError> {
        for end in [&edge.source, &edge.target] {
            if !self.contains(end.as_str()) {
                return Err(GraphError::NodeNotFound(end.clone()));
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Remove every edge from `source` to `target`. Returns whether any existed.
    pub fn disconnect(&mut self, source: &str, target: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| !(e.source == source && e.target == target));
        self.edges.len() != before
    }

    /// Edges leaving a node, in list order.
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == id)
    }

    /// Edges entering a node, in list order.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == id)
    }

    /// Resolve the node playback starts from.
    ///
    /// 1. A node named `start` or `node_start`
    /// 2. The first non-choice node with no incoming edges
    /// 3. The first node in list order
    ///
    /// Only an empty graph has no start node.
    pub fn start_node(&self) -> Option<&NodeId> {
        if let Some(explicit) = self
            .nodes
            .iter()
            .find(|n| n.id == "start" || n.id == "node_start")
        {
            return Some(&explicit.id);
        }

        let with_inputs: HashSet<&str> = self.edges.iter().map(|e| e.target.as_str()).collect();
        self.nodes
            .iter()
            .find(|n| !with_inputs.contains(n.id.as_str()) && !n.is_choice())
            .or_else(|| self.nodes.first())
            .map(|n| &n.id)
    }

    /// Resolve where auto-advance goes from a non-choice node.
    ///
    /// A single edge is always followed. With several edges, the first one
    /// leading to a choice node wins, else the first edge in list order.
    /// Returns `None` when the node has no outgoing edges.
    pub fn successor<'a>(&'a self, id: &'a str) -> Option<&'a Edge> {
        let mut outgoing = self.outgoing(id).peekable();
        let first = outgoing.peek().copied()?;
        outgoing
            .find(|e| self.node(e.target.as_str()).is_some_and(|n| n.is_choice()))
            .or(Some(first))
    }

    /// Export the hub registry: every hub node, in list order, with its burn rules.
    pub fn hub_configs(&self) -> Vec<HubConfig> {
        self.nodes
            .iter()
            .filter(|n| n.is_hub())
            .map(|hub| HubConfig {
                id: hub.id.clone(),
                options: hub.burn_rules.clone(),
            })
            .collect()
    }
}
