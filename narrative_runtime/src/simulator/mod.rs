//! Graph Simulator - plays an authoring graph directly, before compilation.
//!
//! Implements [`StoryInterpreter`], so the narrative engine and play session
//! can preview a story straight from the editor. Each `continue_step`
//! narrates one node and then auto-advances:
//!
//! - exactly one outgoing edge is followed
//! - with several, the first edge into a choice node wins, else the first edge
//! - entering a choice node suspends auto-advance until a choice is made
//! - no outgoing edges ends the story: `can_continue` is false there, but
//!   `can_finish` lets a driver narrate that last node once

mod tags;

pub use tags::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use story_graph::{NodeId, StoryGraph, StoryNode};

use crate::interpreter::{Choice, InterpreterError, StoryInterpreter, VariableValue};

/// Serialized simulator position.
#[derive(Debug, Serialize, Deserialize)]
struct SimulatorState {
    #[serde(alias = "currentNodeId")]
    current_node_id: Option<NodeId>,
    #[serde(default)]
    variables: BTreeMap<String, VariableValue>,
    #[serde(default)]
    history_stack: Vec<NodeId>,
    #[serde(default)]
    awaiting_choice: bool,
}

/// Step-by-step player for a [`StoryGraph`].
#[derive(Debug, Clone)]
pub struct GraphSimulator {
    graph: StoryGraph,
    current: Option<NodeId>,
    variables: BTreeMap<String, VariableValue>,
    current_tags: Vec<String>,

    /// Nodes narrated so far, most recent last. Popped by `go_back`.
    history_stack: Vec<NodeId>,

    awaiting_choice: bool,
}

impl GraphSimulator {
    /// Create a simulator positioned at the graph's start node.
    pub fn new(graph: StoryGraph) -> Self {
        let current = graph.start_node().cloned();
        Self {
            graph,
            current,
            variables: BTreeMap::new(),
            current_tags: Vec::new(),
            history_stack: Vec::new(),
            awaiting_choice: false,
        }
    }

    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    pub fn current_node_id(&self) -> Option<&NodeId> {
        self.current.as_ref()
    }

    pub fn is_awaiting_choice(&self) -> bool {
        self.awaiting_choice
    }

    /// Number of steps `go_back` can undo.
    pub fn history_depth(&self) -> usize {
        self.history_stack.len()
    }

    /// Return to the start node with history and variables cleared.
    pub fn restart(&mut self) {
        *self = Self::new(std::mem::take(&mut self.graph));
    }

    /// Rewind to the last narrated node. Returns whether anything was popped.
    ///
    /// This is a single-step rewind, not a choice undo: continuing afterwards
    /// narrates that node again and re-emits its tags.
    pub fn go_back(&mut self) -> bool {
        match self.history_stack.pop() {
            Some(previous) => {
                self.current = Some(previous);
                self.awaiting_choice = false;
                true
            }
            None => false,
        }
    }

    fn current_node(&self) -> Option<&StoryNode> {
        self.current.as_ref().and_then(|id| self.graph.node(id.as_str()))
    }

    /// Move past `from` following the auto-advance rules.
    fn advance_from(&mut self, from: &str) {
        let next = self.graph.successor(from).map(|edge| edge.target.clone());
        match next {
            Some(target) => match self.graph.node(target.as_str()) {
                Some(node) if node.is_choice() => {
                    self.current = Some(target);
                    self.awaiting_choice = true;
                }
                Some(_) => self.current = Some(target),
                None => {
                    log::warn!("Edge from '{}' points at missing node '{}'", from, target);
                    self.current = None;
                }
            },
            None => self.current = None,
        }
    }
}

impl StoryInterpreter for GraphSimulator {
    /// The compiled form is the JSON of a [`StoryGraph`].
    fn from_compiled(data: &str) -> Result<Self, InterpreterError> {
        let graph: StoryGraph =
            serde_json::from_str(data).map_err(|e| InterpreterError::InvalidStory(e.to_string()))?;
        Ok(Self::new(graph))
    }

    fn can_continue(&self) -> bool {
        if self.awaiting_choice {
            return false;
        }
        match self.current_node() {
            Some(node) if !node.is_choice() => self.graph.outgoing(node.id.as_str()).next().is_some(),
            _ => false,
        }
    }

    /// A current non-choice node without outgoing edges is an ending still
    /// waiting to be narrated. Narrating it leaves no current node.
    fn can_finish(&self) -> bool {
        if self.awaiting_choice {
            return false;
        }
        match self.current_node() {
            Some(node) if !node.is_choice() => self.graph.outgoing(node.id.as_str()).next().is_none(),
            _ => false,
        }
    }

    fn continue_step(&mut self) -> Result<String, InterpreterError> {
        let id = match self.current_node() {
            Some(node) if !self.awaiting_choice && !node.is_choice() => node.id.clone(),
            _ => return Err(InterpreterError::CannotContinue),
        };

        self.history_stack.push(id.clone());

        let raw = self
            .current_node()
            .map(|node| node.raw_text.clone())
            .unwrap_or_default();
        let TaggedText { text, tags } = extract_tags(&raw);
        self.current_tags = tags;

        self.advance_from(id.as_str());
        Ok(text)
    }

    fn current_tags(&self) -> &[String] {
        &self.current_tags
    }

    fn current_choices(&self) -> Vec<Choice> {
        let Some(node) = self.current_node().filter(|n| n.is_choice()) else {
            return Vec::new();
        };

        self.graph
            .outgoing(node.id.as_str())
            .enumerate()
            .map(|(index, edge)| {
                let target_label = self
                    .graph
                    .node(edge.target.as_str())
                    .map(|n| n.label.as_str())
                    .filter(|l| !l.trim().is_empty());
                let text = edge
                    .display_label()
                    .or(target_label)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Option {}", index + 1));
                Choice::new(index, text).with_target(edge.target.as_str())
            })
            .collect()
    }

    fn choose(&mut self, index: usize) -> Result<(), InterpreterError> {
        let choices = self.current_choices();
        let choice = choices.get(index).ok_or(InterpreterError::ChoiceOutOfRange {
            index,
            available: choices.len(),
        })?;

        self.current = choice.target_path.clone().map(NodeId::from);
        self.awaiting_choice = false;
        Ok(())
    }

    fn save_state(&self) -> Result<String, InterpreterError> {
        let state = SimulatorState {
            current_node_id: self.current.clone(),
            variables: self.variables.clone(),
            history_stack: self.history_stack.clone(),
            awaiting_choice: self.awaiting_choice,
        };
        serde_json::to_string(&state).map_err(|e| InterpreterError::InvalidState(e.to_string()))
    }

    fn load_state(&mut self, snapshot: &str) -> Result<(), InterpreterError> {
        let state: SimulatorState =
            serde_json::from_str(snapshot).map_err(|e| InterpreterError::InvalidState(e.to_string()))?;
        self.current = state.current_node_id;
        self.variables = state.variables;
        self.history_stack = state.history_stack;
        self.awaiting_choice = state.awaiting_choice;
        self.current_tags.clear();
        Ok(())
    }

    /// The simulator has no declarations; every name reads as unset until written.
    fn variable(&self, name: &str) -> Result<Option<VariableValue>, InterpreterError> {
        Ok(self.variables.get(name).cloned())
    }

    fn set_variable(&mut self, name: &str, value: VariableValue) -> Result<(), InterpreterError> {
        self.variables.insert(name.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_graph::Edge;

    fn graph(nodes: Vec<StoryNode>, edges: Vec<Edge>) -> StoryGraph {
        StoryGraph::from_parts(nodes, edges)
    }

    fn fork() -> GraphSimulator {
        GraphSimulator::new(graph(
            vec![
                StoryNode::knot("start").with_text("A fork. #music:wind"),
                StoryNode::choice("pick"),
                StoryNode::knot("left").with_label("The left path").with_text("Trees."),
                StoryNode::knot("right").with_text("Rocks."),
                StoryNode::knot("back").with_text("# shake\nYou turn back."),
            ],
            vec![
                Edge::new("start", "pick"),
                Edge::new("pick", "left"),
                Edge::new("pick", "right").with_label("Go right"),
                Edge::new("pick", "back"),
                Edge::new("left", "right"),
            ],
        ))
    }

    #[test]
    fn test_single_terminal_node() {
        let sim = GraphSimulator::new(graph(vec![StoryNode::knot("start").with_text("Alone.")], vec![]));

        assert_eq!(sim.current_node_id().unwrap(), "start");
        assert!(!sim.can_continue());
        assert!(sim.current_choices().is_empty());
    }

    #[test]
    fn test_ending_is_finished_once() {
        let mut sim = fork();
        sim.continue_step().unwrap();
        sim.choose(1).unwrap();

        assert_eq!(sim.current_node_id().unwrap(), "right");
        assert!(!sim.can_continue());
        assert!(sim.can_finish());
        assert_eq!(sim.continue_step().unwrap(), "Rocks.");

        assert!(sim.current_node_id().is_none());
        assert!(!sim.can_finish());
    }

    #[test]
    fn test_can_finish_false_while_awaiting_choice() {
        let mut sim = fork();
        assert!(!sim.can_finish());

        sim.continue_step().unwrap();
        assert!(sim.is_awaiting_choice());
        assert!(!sim.can_finish());
    }

    #[test]
    fn test_engine_narrates_ending_after_choice() {
        use crate::engine::NarrativeEngine;

        let compiled = serde_json::to_string(fork().graph()).unwrap();
        let mut engine = NarrativeEngine::<GraphSimulator>::new();
        engine.init_story(&compiled, None, None).unwrap();
        assert_eq!(engine.continue_story().unwrap().text, "A fork.");

        let output = engine.make_choice(1).unwrap();

        assert_eq!(output.text, "Rocks.");
        assert!(engine.is_ended());
        let log: Vec<_> = engine.history().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(log, vec!["A fork.", "> Go right", "Rocks."]);
    }

    #[test]
    fn test_engine_narrates_lone_start_node() {
        use crate::engine::NarrativeEngine;

        let graph = graph(vec![StoryNode::knot("start").with_text("Alone.")], vec![]);
        let mut engine = NarrativeEngine::<GraphSimulator>::new();
        engine
            .init_story(&serde_json::to_string(&graph).unwrap(), None, None)
            .unwrap();

        assert!(engine.can_continue());
        assert_eq!(engine.continue_story().unwrap().text, "Alone.");
        assert!(engine.is_ended());
    }

    #[test]
    fn test_empty_graph_never_continues() {
        let mut sim = GraphSimulator::new(StoryGraph::new());

        assert!(sim.current_node_id().is_none());
        assert!(!sim.can_continue());
        assert_eq!(sim.continue_step(), Err(InterpreterError::CannotContinue));
    }

    #[test]
    fn test_continue_into_choice_awaits() {
        let mut sim = fork();

        assert!(sim.can_continue());
        let text = sim.continue_step().unwrap();

        assert_eq!(text, "A fork.");
        assert_eq!(sim.current_tags(), ["music:wind".to_string()]);
        assert!(sim.is_awaiting_choice());
        assert!(!sim.can_continue());
        assert_eq!(sim.continue_step(), Err(InterpreterError::CannotContinue));
    }

    #[test]
    fn test_choice_labels_fall_back() {
        let mut sim = fork();
        sim.continue_step().unwrap();

        let texts: Vec<_> = sim.current_choices().into_iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["The left path", "Go right", "Option 3"]);
        assert_eq!(sim.current_choices()[0].target_knot(), Some("left"));
    }

    #[test]
    fn test_choose_moves_to_target() {
        let mut sim = fork();
        sim.continue_step().unwrap();

        sim.choose(2).unwrap();

        assert_eq!(sim.current_node_id().unwrap(), "back");
        assert!(!sim.is_awaiting_choice());
        assert_eq!(sim.continue_step().unwrap(), "You turn back.");
        assert_eq!(sim.current_tags(), ["shake".to_string()]);
    }

    #[test]
    fn test_choose_out_of_range() {
        let mut sim = fork();
        sim.continue_step().unwrap();

        assert_eq!(
            sim.choose(7),
            Err(InterpreterError::ChoiceOutOfRange { index: 7, available: 3 })
        );
        assert!(sim.is_awaiting_choice());
    }

    #[test]
    fn test_tags_reset_each_step() {
        let mut sim = fork();
        sim.continue_step().unwrap();
        sim.choose(0).unwrap();

        assert_eq!(sim.continue_step().unwrap(), "Trees.");
        assert!(sim.current_tags().is_empty());
    }

    #[test]
    fn test_go_back_on_empty_history() {
        let mut sim = fork();

        assert!(!sim.go_back());
        assert_eq!(sim.current_node_id().unwrap(), "start");
    }

    #[test]
    fn test_go_back_replays_node() {
        let mut sim = fork();
        sim.continue_step().unwrap();
        assert_eq!(sim.history_depth(), 1);

        assert!(sim.go_back());

        assert_eq!(sim.current_node_id().unwrap(), "start");
        assert!(!sim.is_awaiting_choice());
        assert!(sim.can_continue());
        assert_eq!(sim.continue_step().unwrap(), "A fork.");
        assert_eq!(sim.current_tags(), ["music:wind".to_string()]);
    }

    #[test]
    fn test_multiple_edges_prefer_choice() {
        let mut sim = GraphSimulator::new(graph(
            vec![
                StoryNode::knot("start"),
                StoryNode::knot("elsewhere"),
                StoryNode::choice("pick"),
            ],
            vec![Edge::new("start", "elsewhere"), Edge::new("start", "pick")],
        ));

        sim.continue_step().unwrap();

        assert_eq!(sim.current_node_id().unwrap(), "pick");
        assert!(sim.is_awaiting_choice());
    }

    #[test]
    fn test_ambiguous_edges_follow_first() {
        let mut sim = GraphSimulator::new(graph(
            vec![StoryNode::knot("start"), StoryNode::knot("b"), StoryNode::knot("c")],
            vec![Edge::new("start", "c"), Edge::new("start", "b")],
        ));

        sim.continue_step().unwrap();

        assert_eq!(sim.current_node_id().unwrap(), "c");
    }

    #[test]
    fn test_dangling_edge_ends_story() {
        let mut sim = GraphSimulator::new(graph(
            vec![StoryNode::knot("start").with_text("Hi")],
            vec![Edge::new("start", "ghost")],
        ));

        assert!(sim.can_continue());
        assert_eq!(sim.continue_step().unwrap(), "Hi");
        assert!(sim.current_node_id().is_none());
        assert!(!sim.can_continue());
        assert!(sim.current_choices().is_empty());
    }

    #[test]
    fn test_state_round_trip() {
        let mut sim = fork();
        sim.set_variable("seen_fork", VariableValue::Bool(true)).unwrap();
        sim.continue_step().unwrap();
        let snapshot = sim.save_state().unwrap();

        let mut restored = fork();
        restored.load_state(&snapshot).unwrap();

        assert_eq!(restored.current_node_id().unwrap(), "pick");
        assert!(restored.is_awaiting_choice());
        assert_eq!(restored.history_depth(), 1);
        assert_eq!(restored.variable("seen_fork").unwrap(), Some(VariableValue::Bool(true)));
    }

    #[test]
    fn test_load_camel_case_state() {
        let mut sim = fork();
        sim.load_state(r#"{"currentNodeId":"left","variables":{"hp":10}}"#).unwrap();

        assert_eq!(sim.current_node_id().unwrap(), "left");
        assert_eq!(sim.variable("hp").unwrap(), Some(VariableValue::Int(10)));
        assert!(sim.can_continue());
    }

    #[test]
    fn test_corrupt_state_is_rejected() {
        let mut sim = fork();
        assert!(matches!(sim.load_state("42"), Err(InterpreterError::InvalidState(_))));
        assert_eq!(sim.current_node_id().unwrap(), "start");
    }

    #[test]
    fn test_from_compiled() {
        let json = serde_json::to_string(fork().graph()).unwrap();
        let sim = GraphSimulator::from_compiled(&json).unwrap();
        assert_eq!(sim.current_node_id().unwrap(), "start");

        assert!(matches!(
            GraphSimulator::from_compiled("nope"),
            Err(InterpreterError::InvalidStory(_))
        ));
    }

    #[test]
    fn test_restart() {
        let mut sim = fork();
        sim.continue_step().unwrap();
        sim.set_variable("x", VariableValue::Int(1)).unwrap();

        sim.restart();

        assert_eq!(sim.current_node_id().unwrap(), "start");
        assert_eq!(sim.history_depth(), 0);
        assert_eq!(sim.variable("x").unwrap(), None);
    }
}
