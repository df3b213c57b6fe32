//! A scripted interpreter for exercising the engine without real story data.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::interpreter::{Choice, InterpreterError, StoryInterpreter, VariableValue};

/// One low-level step: its text and tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Beat {
    pub text: String,
    pub tags: Vec<String>,
}

/// An option and the beats that follow it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptedChoice {
    pub text: String,
    pub target: Option<String>,
    pub then: Vec<Beat>,
    #[serde(default)]
    pub choices: Vec<ScriptedChoice>,
}

/// Plays back a fixed list of beats, then offers fixed choices.
///
/// Only variables present at construction are declared; touching any other
/// name fails the way a real interpreter does.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptedInterpreter {
    pub beats: VecDeque<Beat>,
    pub choices: Vec<ScriptedChoice>,
    pub variables: BTreeMap<String, VariableValue>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ScriptedInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn beat(mut self, text: &str, tags: &[&str]) -> Self {
        self.beats.push_back(Beat {
            text: text.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn choice(mut self, text: &str, target: Option<&str>, then: &[(&str, &[&str])]) -> Self {
        self.choices.push(ScriptedChoice {
            text: text.to_string(),
            target: target.map(str::to_string),
            then: then
                .iter()
                .map(|(text, tags)| Beat {
                    text: text.to_string(),
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                })
                .collect(),
            choices: Vec::new(),
        });
        self
    }

    pub fn declare(mut self, name: &str, value: impl Into<VariableValue>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    /// Compiled form accepted by [`StoryInterpreter::from_compiled`].
    pub fn compile(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}

impl StoryInterpreter for ScriptedInterpreter {
    fn from_compiled(data: &str) -> Result<Self, InterpreterError> {
        serde_json::from_str(data).map_err(|e| InterpreterError::InvalidStory(e.to_string()))
    }

    fn can_continue(&self) -> bool {
        !self.beats.is_empty()
    }

    fn continue_step(&mut self) -> Result<String, InterpreterError> {
        let beat = self.beats.pop_front().ok_or(InterpreterError::CannotContinue)?;
        self.tags = beat.tags;
        Ok(beat.text)
    }

    fn current_tags(&self) -> &[String] {
        &self.tags
    }

    fn current_choices(&self) -> Vec<Choice> {
        if !self.beats.is_empty() {
            return Vec::new();
        }
        self.choices
            .iter()
            .enumerate()
            .map(|(i, c)| Choice {
                index: i,
                text: c.text.clone(),
                target_path: c.target.clone(),
            })
            .collect()
    }

    fn choose(&mut self, index: usize) -> Result<(), InterpreterError> {
        let available = self.current_choices().len();
        if index >= available {
            return Err(InterpreterError::ChoiceOutOfRange { index, available });
        }
        let chosen = self.choices.remove(index);
        self.beats = chosen.then.into();
        self.choices = chosen.choices;
        Ok(())
    }

    fn save_state(&self) -> Result<String, InterpreterError> {
        Ok(self.compile())
    }

    fn load_state(&mut self, snapshot: &str) -> Result<(), InterpreterError> {
        *self = serde_json::from_str(snapshot).map_err(|e| InterpreterError::InvalidState(e.to_string()))?;
        Ok(())
    }

    fn variable(&self, name: &str) -> Result<Option<VariableValue>, InterpreterError> {
        self.variables
            .get(name)
            .cloned()
            .map(Some)
            .ok_or_else(|| InterpreterError::UndeclaredVariable(name.to_string()))
    }

    fn set_variable(&mut self, name: &str, value: VariableValue) -> Result<(), InterpreterError> {
        match self.variables.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(InterpreterError::UndeclaredVariable(name.to_string())),
        }
    }
}
