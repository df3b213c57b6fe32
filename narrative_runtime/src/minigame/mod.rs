//! Minigame lifecycle - the handoff between narrative and external minigames.
//!
//! States: Idle -> Pending -> Playing -> Idle
//!
//! 1. **Queue**: a `minigame:` tag is seen in step output
//! 2. **Start**: the host is ready to run the queued game
//! 3. **Finish/Cancel**: the game ends with a result, or is abandoned

mod parse;

pub use parse::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parameter value parsed from a minigame tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinigameParam {
    Number(f64),
    Text(String),
}

/// What to play and how, as described by a minigame tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinigameConfig {
    /// Lowercased minigame type, e.g. `qte` or `lockpick`.
    pub kind: String,
    pub params: BTreeMap<String, MinigameParam>,
    pub auto_start: bool,
}

impl MinigameConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: BTreeMap::new(),
            auto_start: true,
        }
    }

    /// Add or replace a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: MinigameParam) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// A numeric parameter, if present and numeric.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.params.get(key) {
            Some(MinigameParam::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// A text parameter, if present and textual.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.params.get(key) {
            Some(MinigameParam::Text(s)) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinigameState {
    #[default]
    Idle,
    /// A game is queued but not started.
    Pending,
    Playing,
}

/// Tracks the single minigame a session may be running.
#[derive(Debug, Clone, Default)]
pub struct MinigameController {
    state: MinigameState,
    config: Option<MinigameConfig>,
    last_result: Option<i64>,
}

impl MinigameController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a game, replacing anything already queued.
    pub fn queue(&mut self, config: MinigameConfig) {
        log::info!("Queuing minigame '{}'", config.kind);
        self.config = Some(config);
        self.state = MinigameState::Pending;
    }

    /// Start the queued game. Only valid while pending.
    pub fn start(&mut self) -> bool {
        if self.state != MinigameState::Pending {
            log::warn!("Cannot start minigame: nothing is pending");
            return false;
        }
        if let Some(config) = &self.config {
            log::info!("Starting minigame '{}'", config.kind);
        }
        self.state = MinigameState::Playing;
        true
    }

    /// End the game and return the result code committed to the story:
    /// `1` for a win, `0` for a loss.
    pub fn finish(&mut self, won: bool) -> i64 {
        let result = i64::from(won);
        log::info!("Minigame finished with result {}", result);
        self.last_result = Some(result);
        self.state = MinigameState::Idle;
        self.config = None;
        result
    }

    /// Abandon the game without a result.
    pub fn cancel(&mut self) {
        log::info!("Minigame cancelled");
        self.state = MinigameState::Idle;
        self.config = None;
    }

    /// Forget the queued game and the last result.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MinigameState {
        self.state
    }

    /// The queued or running game, if any.
    pub fn config(&self) -> Option<&MinigameConfig> {
        self.config.as_ref()
    }

    /// Result code of the most recently finished game.
    pub fn last_result(&self) -> Option<i64> {
        self.last_result
    }

    /// Whether a game is queued but not started.
    pub fn is_pending(&self) -> bool {
        self.state == MinigameState::Pending
    }

    /// Whether a game is running.
    pub fn is_playing(&self) -> bool {
        self.state == MinigameState::Playing
    }
}
