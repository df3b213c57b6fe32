//! Errors that reach callers of the engine and session.
//!
//! Only caller bugs surface here. Bad save data and inconsistent content are
//! absorbed where they are read.

use thiserror::Error;

use crate::interpreter::InterpreterError;

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("no story is loaded")]
    NoStoryLoaded,

    #[error(transparent)]
    Interpreter(#[from] InterpreterError),
}
