//! # Narrative Runtime
//!
//! Turns a node-graph story interpreter into a paced stream of text,
//! choices and tags that a UI can consume one beat at a time, and keeps the
//! hub exclusion state that burns future branches as a side effect of
//! earlier choices.
//!
//! ## Core Components
//!
//! - **hubs**: Hub exclusion registry and the burned-branch tracker
//! - **interpreter**: The interface any story interpreter must expose
//! - **engine**: Continue-until-stop stepping, history and the variable bridge
//! - **simulator**: Interpreter over a plain authoring graph for previews
//! - **minigame**: Minigame tag parsing and start/finish/cancel lifecycle
//! - **save**: Save snapshots and on-disk save slots
//! - **session**: One play session wiring all of the above together
//!
//! ## Design Philosophy
//!
//! - **Session-Owned**: Registries are values handed to a session, never process globals
//! - **Total on Bad Data**: Malformed saves and content degrade to a safe fallback
//! - **Interpreter-Agnostic**: The engine depends only on the [`StoryInterpreter`] trait

pub mod config;
pub mod engine;
pub mod error;
pub mod hubs;
pub mod interpreter;
pub mod minigame;
pub mod save;
pub mod session;
pub mod simulator;

#[cfg(test)]
pub(crate) mod testing;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use hubs::*;
pub use interpreter::*;
pub use minigame::*;
pub use save::*;
pub use session::*;
pub use simulator::*;
