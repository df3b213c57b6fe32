//! Editor project files.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::graph::StoryGraph;

/// Current project file version.
pub const PROJECT_VERSION: &str = "1.0.0";

/// Errors from project persistence.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An authored story as saved by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryProject {
    pub version: String,
    pub title: String,

    #[serde(flatten)]
    pub graph: StoryGraph,

    /// Milliseconds since the Unix epoch of the last save, if ever saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<u64>,
}

impl Default for StoryProject {
    fn default() -> Self {
        Self::new("Untitled Story")
    }
}

impl StoryProject {
    /// Create an empty project.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            version: PROJECT_VERSION.to_string(),
            title: title.into(),
            graph: StoryGraph::new(),
            saved_at: None,
        }
    }

    pub fn with_graph(mut self, graph: StoryGraph) -> Self {
        self.graph = graph;
        self
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Stamp the save time and write the project to a JSON file.
    pub fn save_json(&mut self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        self.saved_at = Some(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default(),
        );
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load a project from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
