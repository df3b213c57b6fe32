//! Hub burn rules and the hub registry wire format.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// "If the player's choice routes through `target`, invalidate every id in `burns`."
///
/// `burns` entries are soft references: an id that never appears in the
/// story makes the rule a no-op rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub target: NodeId,
    #[serde(default)]
    pub burns: Vec<NodeId>,
}

impl ExclusionRule {
    pub fn new(target: impl Into<NodeId>) -> Self {
        Self {
            target: target.into(),
            burns: Vec::new(),
        }
    }

    /// Add a branch to burn when this rule fires.
    pub fn burns(mut self, id: impl Into<NodeId>) -> Self {
        self.burns.push(id.into());
        self
    }
}

/// One hub entry of the registry wire format: `{ id, options: [{ target, burns }] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubConfig {
    pub id: NodeId,
    #[serde(default)]
    pub options: Vec<ExclusionRule>,
}

impl HubConfig {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, rule: ExclusionRule) -> Self {
        self.options.push(rule);
        self
    }
}
