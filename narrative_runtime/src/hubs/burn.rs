//! Burn Tracker - the set of branches invalidated during a playthrough.

use std::collections::HashSet;

use story_graph::NodeId;

use super::HubRegistry;
use crate::interpreter::Choice;

/// Tracks burned branch ids for one playthrough.
///
/// The set only grows, except through [`BurnTracker::reset`] and
/// [`BurnTracker::load`]. Insertion order is kept so exports are stable.
#[derive(Debug, Clone, Default)]
pub struct BurnTracker {
    registry: HubRegistry,

    /// Burned ids in the order they were burned.
    burned: Vec<NodeId>,

    /// Membership index over `burned`.
    members: HashSet<NodeId>,
}

impl BurnTracker {
    /// Create a tracker with nothing burned.
    pub fn new(registry: HubRegistry) -> Self {
        Self {
            registry,
            burned: Vec::new(),
            members: HashSet::new(),
        }
    }

    /// The rules this tracker applies.
    pub fn registry(&self) -> &HubRegistry {
        &self.registry
    }

    /// Whether `id` has been burned in this playthrough.
    pub fn is_burned(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Whether the knot a choice leads into has been burned.
    pub fn is_choice_burned(&self, choice: &Choice) -> bool {
        choice.target_knot().is_some_and(|knot| self.is_burned(knot))
    }

    /// Apply the exclusion rule for choosing `target` at `hub`.
    ///
    /// Returns the ids that were newly burned by this call. Unknown hubs and
    /// targets are a no-op.
    pub fn handle_choice(&mut self, hub: &str, target: &str) -> Vec<NodeId> {
        let mut newly_burned = Vec::new();
        for id in self.registry.lookup(hub, target) {
            if self.members.insert(id.clone()) {
                self.burned.push(id.clone());
                newly_burned.push(id.clone());
            }
        }

        if !newly_burned.is_empty() {
            let names: Vec<_> = newly_burned.iter().map(|id| id.as_str()).collect();
            log::info!("Choice '{}' from hub '{}' burned: {}", target, hub, names.join(", "));
        }

        newly_burned
    }

    /// Forget every burned id.
    pub fn reset(&mut self) {
        self.burned.clear();
        self.members.clear();
    }

    /// Replace the burned set wholesale from a persisted list.
    pub fn load<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.reset();
        for id in ids {
            let id = id.into();
            if self.members.insert(id.clone()) {
                self.burned.push(id);
            }
        }
    }

    /// Replace the burned set from untrusted save data.
    ///
    /// Anything other than an array of strings is rejected and the current
    /// state is kept. Returns whether the data was accepted.
    pub fn load_value(&mut self, value: &serde_json::Value) -> bool {
        let Some(items) = value.as_array() else {
            log::warn!("Ignoring burned list: expected an array, got {}", value);
            return false;
        };

        let ids: Option<Vec<&str>> = items.iter().map(|v| v.as_str()).collect();
        match ids {
            Some(ids) => {
                self.load(ids);
                true
            }
            None => {
                log::warn!("Ignoring burned list: entries must be strings");
                false
            }
        }
    }

    /// Snapshot of burned ids in burn order, for persistence.
    pub fn export(&self) -> Vec<String> {
        self.burned.iter().map(|id| id.0.clone()).collect()
    }

    /// Burned ids in burn order.
    pub fn burned(&self) -> &[NodeId] {
        &self.burned
    }

    /// Get the number of burned ids.
    pub fn burned_count(&self) -> usize {
        self.burned.len()
    }
}
