//! Save snapshots - everything needed to resume a play session.
//!
//! A snapshot pairs the interpreter's opaque state with the text on screen
//! and the burned list. The three are only meaningful together: restoring
//! state without the burned list would re-offer branches the player already
//! lost.

mod store;

pub use store::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

use crate::engine::now_millis;

/// Current save file version.
pub const SAVE_VERSION: u32 = 1;

/// Errors from save IO.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Identifier of one save slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveId(pub Uuid);

impl SaveId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SaveId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSnapshot {
    /// Save format version for compatibility checking.
    pub version: u32,
    pub id: SaveId,

    /// Player-facing slot name.
    pub name: String,

    /// Which story this save belongs to.
    pub story_id: String,

    /// Opaque interpreter state.
    pub state: String,

    /// Text on screen when the save was taken.
    #[serde(default)]
    pub text: String,

    /// Burned node ids, in burn order.
    ///
    /// Kept as raw JSON so a damaged list is rejected on its own when the
    /// session restores it, instead of making the whole save unreadable.
    #[serde(default = "empty_burned")]
    pub burned: serde_json::Value,

    /// Milliseconds since the Unix epoch.
    pub saved_at: u64,
}

impl SaveSnapshot {
    pub fn new(
        name: impl Into<String>,
        story_id: impl Into<String>,
        state: impl Into<String>,
        text: impl Into<String>,
        burned: Vec<String>,
    ) -> Self {
        Self {
            version: SAVE_VERSION,
            id: SaveId::new(),
            name: name.into(),
            story_id: story_id.into(),
            state: state.into(),
            text: text.into(),
            burned: serde_json::Value::from(burned),
            saved_at: now_millis(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot, rejecting other save versions.
    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let snapshot: Self = serde_json::from_str(json)?;

        if snapshot.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: snapshot.version,
            });
        }

        Ok(snapshot)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SaveError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

fn empty_burned() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}
