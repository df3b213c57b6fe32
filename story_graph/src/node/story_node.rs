//! Story nodes and the edges between them.

use serde::{Deserialize, Serialize};

use super::{ExclusionRule, NodeId, NodeKind};

/// A single authored node of the story graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryNode {
    pub id: NodeId,

    #[serde(default)]
    pub kind: NodeKind,

    /// Short title shown in the editor and used as fallback choice text.
    #[serde(default)]
    pub label: String,

    /// Freeform narrative text, possibly containing `#tag` lines.
    #[serde(default)]
    pub raw_text: String,

    /// Exclusion rules. Only meaningful on hub nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub burn_rules: Vec<ExclusionRule>,
}

impl StoryNode {
    /// Create a node with the given id and kind.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: String::new(),
            raw_text: String::new(),
            burn_rules: Vec::new(),
        }
    }

    /// Create a hub node.
    pub fn hub(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::Hub)
    }

    /// Create a plain narrative node.
    pub fn knot(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::Knot)
    }

    /// Create a side-branch node.
    pub fn alley(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::Alley)
    }

    /// Create a choice node.
    pub fn choice(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::Choice)
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the raw narrative text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.raw_text = text.into();
        self
    }

    /// Attach a burn rule.
    pub fn with_burn_rule(mut self, rule: ExclusionRule) -> Self {
        self.burn_rules.push(rule);
        self
    }

    /// Whether this node presents its edges as choices.
    pub fn is_choice(&self) -> bool {
        self.kind == NodeKind::Choice
    }

    /// Whether this node is a hub.
    pub fn is_hub(&self) -> bool {
        self.kind == NodeKind::Hub
    }
}

/// A traversal option from `source` to `target`.
///
/// When the source is a choice node, `label` is the option text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label, if set and not blank.
    pub fn display_label(&self) -> Option<&str> {
        self.label.as_deref().filter(|l| !l.trim().is_empty())
    }

    /// Whether this edge touches the given node at either end.
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}
