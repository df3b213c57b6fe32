//! The story interpreter interface.
//!
//! The narrative engine never names a concrete interpreter. Anything that can
//! step through compiled story content, report tags and choices, commit a
//! choice, snapshot its state and expose a variable store can drive it,
//! including the graph simulator used for authoring previews.

mod value;

pub use value::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by an interpreter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InterpreterError {
    #[error("story data could not be read: {0}")]
    InvalidStory(String),

    #[error("saved state could not be read: {0}")]
    InvalidState(String),

    #[error("choice index {index} out of range ({available} available)")]
    ChoiceOutOfRange { index: usize, available: usize },

    #[error("story cannot continue")]
    CannotContinue,

    #[error("variable '{0}' is not declared")]
    UndeclaredVariable(String),
}

/// An option presented to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub index: usize,
    pub text: String,

    /// Where the choice leads, as a dotted path (`knot.stitch.gather`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
}

impl Choice {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            target_path: None,
        }
    }

    pub fn with_target(mut self, path: impl Into<String>) -> Self {
        self.target_path = Some(path.into());
        self
    }

    /// The knot this choice leads into: the first segment of its target path.
    pub fn target_knot(&self) -> Option<&str> {
        self.target_path
            .as_deref()
            .and_then(|path| path.split('.').next())
            .filter(|knot| !knot.is_empty())
    }
}

/// A story interpreter the narrative engine can drive.
pub trait StoryInterpreter {
    /// Build a fresh interpreter from compiled story data.
    fn from_compiled(data: &str) -> Result<Self, InterpreterError>
    where
        Self: Sized;

    /// Whether another low-level step is available.
    fn can_continue(&self) -> bool;

    /// Whether one closing step remains although `can_continue` is false,
    /// such as an ending that has not been narrated yet.
    fn can_finish(&self) -> bool {
        false
    }

    /// Run one low-level step and return its text.
    fn continue_step(&mut self) -> Result<String, InterpreterError>;

    /// Tags attached to the most recent step.
    fn current_tags(&self) -> &[String];

    /// Choices currently on offer.
    fn current_choices(&self) -> Vec<Choice>;

    /// Commit the choice at `index`.
    fn choose(&mut self, index: usize) -> Result<(), InterpreterError>;

    /// Serialize the interpreter's internal state.
    fn save_state(&self) -> Result<String, InterpreterError>;

    /// Restore internal state from [`StoryInterpreter::save_state`] output.
    fn load_state(&mut self, snapshot: &str) -> Result<(), InterpreterError>;

    /// Read a global variable. `Ok(None)` means declared but unset.
    fn variable(&self, name: &str) -> Result<Option<VariableValue>, InterpreterError>;

    /// Write a global variable.
    fn set_variable(&mut self, name: &str, value: VariableValue) -> Result<(), InterpreterError>;
}
