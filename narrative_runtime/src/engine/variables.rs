//! Variable Bridge - best-effort access to the interpreter's globals.
//!
//! Callers may read and write names a given story never declares, so
//! failures are logged and swallowed instead of returned.

use super::NarrativeEngine;
use crate::interpreter::{StoryInterpreter, VariableValue};

impl<I: StoryInterpreter> NarrativeEngine<I> {
    /// Write a global variable. Silently dropped when no story is loaded or
    /// the interpreter refuses the name.
    pub fn set_global_variable(&mut self, name: &str, value: impl Into<VariableValue>) {
        let Some(interpreter) = self.interpreter_mut() else {
            return;
        };
        if let Err(err) = interpreter.set_variable(name, value.into()) {
            log::warn!("Could not set variable '{}': {}", name, err);
        }
    }

    /// Read a global variable, or `None` if it is unset or unavailable.
    pub fn global_variable(&self, name: &str) -> Option<VariableValue> {
        let interpreter = self.interpreter()?;
        match interpreter.variable(name) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Could not get variable '{}': {}", name, err);
                None
            }
        }
    }
}
