//! Hub Registry - static lookup from hub choices to the branches they burn.

use std::collections::HashMap;

use story_graph::{HubConfig, NodeId};

/// Nested mapping `hub -> target -> burns`, built once per rule set.
///
/// Later entries win: a repeated hub id replaces the earlier hub, and a
/// repeated target within a hub replaces the earlier burn list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubRegistry {
    hubs: HashMap<NodeId, HashMap<NodeId, Vec<NodeId>>>,
}

impl HubRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the lookup from authored hub configs.
    pub fn build(configs: &[HubConfig]) -> Self {
        let mut hubs = HashMap::new();
        for hub in configs {
            let targets: HashMap<NodeId, Vec<NodeId>> = hub
                .options
                .iter()
                .map(|rule| (rule.target.clone(), rule.burns.clone()))
                .collect();
            hubs.insert(hub.id.clone(), targets);
        }
        Self { hubs }
    }

    /// Build from the JSON wire format. Malformed input yields an empty registry.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Vec<HubConfig>>(json) {
            Ok(configs) => Self::build(&configs),
            Err(err) => {
                log::warn!("Ignoring malformed hub registry: {}", err);
                Self::new()
            }
        }
    }

    /// Branches burned by choosing `target` at `hub`. Unknown hubs and
    /// targets burn nothing.
    pub fn lookup(&self, hub: &str, target: &str) -> &[NodeId] {
        self.hubs
            .get(hub)
            .and_then(|targets| targets.get(target))
            .map(|burns| burns.as_slice())
            .unwrap_or(&[])
    }

    /// Whether any rules are registered for `hub`.
    pub fn contains_hub(&self, hub: &str) -> bool {
        self.hubs.contains_key(hub)
    }

    /// Get the total number of hubs.
    pub fn hub_count(&self) -> usize {
        self.hubs.len()
    }

    /// Whether the registry has no hubs at all.
    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }
}
