//! Authoring-time checks. Problems are reported, never enforced.

use std::collections::HashSet;

use super::StoryGraph;
use crate::node::NodeId;

/// A problem found in an authored graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphWarning {
    /// Two or more nodes share an id; lookups use the first.
    DuplicateNode(NodeId),

    /// An edge points at (or from) a node that does not exist.
    DanglingEdge { source: NodeId, target: NodeId },

    /// A non-choice node with several outgoing edges, none leading to a choice.
    /// Playback follows the first edge.
    AmbiguousBranch { node: NodeId, targets: Vec<NodeId> },

    /// A hub burn rule whose target is not one of the hub's direct successors.
    UnreachableRuleTarget { hub: NodeId, target: NodeId },
}

impl std::fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphWarning::DuplicateNode(id) => write!(f, "duplicate node id '{}'", id),
            GraphWarning::DanglingEdge { source, target } => {
                write!(f, "edge {} -> {} references a missing node", source, target)
            }
            GraphWarning::AmbiguousBranch { node, targets } => {
                let names: Vec<_> = targets.iter().map(|t| t.as_str()).collect();
                write!(
                    f,
                    "node '{}' branches to {} without a choice; '{}' will be followed",
                    node,
                    names.join(", "),
                    names.first().copied().unwrap_or_default()
                )
            }
            GraphWarning::UnreachableRuleTarget { hub, target } => {
                write!(f, "hub '{}' has a burn rule for '{}' which it does not lead to", hub, target)
            }
        }
    }
}

impl StoryGraph {
    /// Collect every authoring problem in the graph.
    pub fn validate(&self) -> Vec<GraphWarning> {
        let mut warnings = Vec::new();

        // Duplicate ids
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for node in self.nodes() {
            if !seen.insert(node.id.as_str()) && reported.insert(node.id.as_str()) {
                warnings.push(GraphWarning::DuplicateNode(node.id.clone()));
            }
        }

        // Dangling edges
        for edge in self.edges() {
            if !seen.contains(edge.source.as_str()) || !seen.contains(edge.target.as_str()) {
                warnings.push(GraphWarning::DanglingEdge {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                });
            }
        }

        for node in self.nodes() {
            let id = node.id.as_str();

            if !node.is_choice() {
                let targets: Vec<NodeId> = self.outgoing(id).map(|e| e.target.clone()).collect();
                let leads_to_choice = targets
                    .iter()
                    .any(|t| self.node(t.as_str()).is_some_and(|n| n.is_choice()));
                if targets.len() > 1 && !leads_to_choice {
                    warnings.push(GraphWarning::AmbiguousBranch {
                        node: node.id.clone(),
                        targets,
                    });
                }
            }

            if node.is_hub() {
                for rule in &node.burn_rules {
                    if !self.outgoing(id).any(|e| e.target == rule.target) {
                        warnings.push(GraphWarning::UnreachableRuleTarget {
                            hub: node.id.clone(),
                            target: rule.target.clone(),
                        });
                    }
                }
            }
        }

        warnings
    }
}
