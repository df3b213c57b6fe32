//! Story History - the append-only log shown to the player.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// What produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Narrated text.
    Text,
    /// Echo of a player choice.
    Choice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    pub kind: EntryKind,

    /// Tags aggregated with this text batch. Empty for choice echoes.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Append-only log of narrated text and choice echoes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryHistory {
    entries: Vec<HistoryEntry>,
}

impl StoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a narrated batch.
    pub fn push_text(&mut self, text: impl Into<String>, tags: Vec<String>) {
        self.entries.push(HistoryEntry {
            text: text.into(),
            kind: EntryKind::Text,
            tags,
            timestamp: now_millis(),
        });
    }

    /// Record a player choice as a `"> "`-prefixed echo.
    pub fn push_choice(&mut self, choice_text: &str) {
        self.entries.push(HistoryEntry {
            text: format!("> {}", choice_text),
            kind: EntryKind::Choice,
            tags: Vec::new(),
            timestamp: now_millis(),
        });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
