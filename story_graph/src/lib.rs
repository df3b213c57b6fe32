//! # Story Graph
//!
//! The authoring model for Bardo stories. A story is drawn as a graph of
//! nodes (hubs, knots, alleys and choice points) joined by edges; hub nodes
//! carry burn rules that invalidate other branches once the player commits
//! to a route.
//!
//! This crate holds data and edit operations only. Playback lives in
//! `narrative_runtime`.

pub mod export;
pub mod graph;
pub mod node;
pub mod project;

pub use export::*;
pub use graph::*;
pub use node::*;
pub use project::*;
