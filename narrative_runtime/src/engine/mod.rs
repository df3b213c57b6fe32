//! Narrative Step Engine - paces interpreter output for the UI.
//!
//! One `continue_story` call runs the interpreter until a stop condition:
//! 1. **Step**: Run one low-level interpreter step
//! 2. **Accumulate**: Append its text, separated by a blank line
//! 3. **Collect**: Append its tags to the call's aggregate, in order
//! 4. **Pause**: Stop after a step tagged `next`/`page` or `minigame:...`
//! 5. **Publish**: Expose text, choices and the continue/ended flags
//! 6. **Log**: Append non-empty text to the history

mod history;
mod variables;

pub use history::*;
pub(crate) use history::now_millis;

use crate::error::NarrativeError;
use crate::interpreter::{Choice, InterpreterError, StoryInterpreter};

/// Tags that force a pause after the step carrying them (case-insensitive, trimmed).
pub const PAGINATION_TAGS: [&str; 2] = ["next", "page"];

/// Prefix of tags that hand control to a minigame.
pub const MINIGAME_TAG_PREFIX: &str = "minigame:";

const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Whether a tag forces a pagination break.
pub fn is_pagination_tag(tag: &str) -> bool {
    let tag = tag.trim().to_lowercase();
    PAGINATION_TAGS.contains(&tag.as_str())
}

/// Whether a tag triggers a minigame.
pub fn is_minigame_tag(tag: &str) -> bool {
    tag.trim().to_lowercase().starts_with(MINIGAME_TAG_PREFIX)
}

/// Externally visible engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    /// No story loaded.
    Idle,
    /// Waiting for a continue or a choice.
    Ready,
    /// No more content and no choices.
    Ended,
}

/// Text and tags produced by a single continue or choice call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutput {
    pub text: String,
    pub tags: Vec<String>,
}

/// Drives a [`StoryInterpreter`] one caller-visible beat at a time.
#[derive(Debug)]
pub struct NarrativeEngine<I> {
    interpreter: Option<I>,
    text: String,
    choices: Vec<Choice>,
    current_tags: Vec<String>,
    can_continue: bool,
    is_ended: bool,
    history: StoryHistory,
}

impl<I> Default for NarrativeEngine<I> {
    fn default() -> Self {
        Self {
            interpreter: None,
            text: String::new(),
            choices: Vec::new(),
            current_tags: Vec::new(),
            can_continue: false,
            is_ended: false,
            history: StoryHistory::new(),
        }
    }
}

impl<I: StoryInterpreter> NarrativeEngine<I> {
    /// Create an idle engine with no story loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a story, optionally resuming from a save.
    ///
    /// With `saved_state`, the interpreter's internal position is restored.
    /// With `saved_text` as well, that text is republished as-is instead of
    /// stepping, so narrative side effects do not replay on resume. A saved
    /// state the interpreter rejects is dropped with a warning and the story
    /// starts fresh, ignoring `saved_text`.
    ///
    /// Returns whether a saved state was restored.
    pub fn init_story(
        &mut self,
        compiled: &str,
        saved_state: Option<&str>,
        saved_text: Option<&str>,
    ) -> Result<bool, NarrativeError> {
        let mut interpreter = I::from_compiled(compiled)?;
        let mut restored = true;

        if let Some(snapshot) = saved_state {
            if let Err(err) = interpreter.load_state(snapshot) {
                log::warn!("Discarding unreadable saved state, starting fresh: {}", err);
                interpreter = I::from_compiled(compiled)?;
                restored = false;
            }
        }

        self.history.clear();
        self.current_tags.clear();
        self.choices = interpreter.current_choices();
        self.can_continue = has_more(&interpreter);

        match saved_text.filter(|text| restored && !text.is_empty()) {
            Some(text) => {
                self.text = text.to_string();
                self.is_ended = !self.can_continue && self.choices.is_empty();
                self.history.push_text(text, Vec::new());
            }
            None => {
                self.text.clear();
                self.is_ended = false;
            }
        }

        self.interpreter = Some(interpreter);
        Ok(restored && saved_state.is_some())
    }

    /// Advance the story to the next pause point.
    pub fn continue_story(&mut self) -> Result<StepOutput, NarrativeError> {
        let interpreter = self.interpreter.as_mut().ok_or(NarrativeError::NoStoryLoaded)?;
        let output = step_until_pause(interpreter)?;
        Ok(self.publish(output))
    }

    /// Commit a choice, echo it to the history, then advance like
    /// [`NarrativeEngine::continue_story`].
    ///
    /// An out-of-range index is reported by the interpreter and surfaces as
    /// an error.
    pub fn make_choice(&mut self, index: usize) -> Result<StepOutput, NarrativeError> {
        let interpreter = self.interpreter.as_mut().ok_or(NarrativeError::NoStoryLoaded)?;

        // Capture the text before the interpreter moves on.
        let choice_text = interpreter
            .current_choices()
            .into_iter()
            .nth(index)
            .map(|choice| choice.text);

        interpreter.choose(index)?;

        if let Some(text) = choice_text.filter(|t| !t.is_empty()) {
            self.history.push_choice(&text);
        }

        let output = step_until_pause(interpreter)?;
        Ok(self.publish(output))
    }

    /// Discard the interpreter and every piece of published state.
    pub fn reset_story_state(&mut self) {
        *self = Self::new();
    }

    /// Snapshot of the interpreter's internal state, if a story is loaded.
    pub fn save_state(&self) -> Option<String> {
        let interpreter = self.interpreter.as_ref()?;
        match interpreter.save_state() {
            Ok(state) => Some(state),
            Err(err) => {
                log::warn!("Could not snapshot interpreter state: {}", err);
                None
            }
        }
    }

    fn publish(&mut self, output: StepOutput) -> StepOutput {
        if let Some(interpreter) = self.interpreter.as_ref() {
            self.choices = interpreter.current_choices();
            self.can_continue = has_more(interpreter);
        }
        self.is_ended = !self.can_continue && self.choices.is_empty();
        self.text = output.text.clone();
        self.current_tags = output.tags.clone();

        if !output.text.is_empty() {
            self.history.push_text(output.text.clone(), output.tags.clone());
        }

        output
    }
}

impl<I> NarrativeEngine<I> {
    pub fn mode(&self) -> EngineMode {
        match self.interpreter {
            None => EngineMode::Idle,
            Some(_) if self.is_ended => EngineMode::Ended,
            Some(_) => EngineMode::Ready,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.interpreter.is_some()
    }

    /// Text published by the last call.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Tags aggregated by the last call.
    pub fn current_tags(&self) -> &[String] {
        &self.current_tags
    }

    pub fn can_continue(&self) -> bool {
        self.can_continue
    }

    pub fn is_ended(&self) -> bool {
        self.is_ended
    }

    pub fn history(&self) -> &StoryHistory {
        &self.history
    }

    pub fn interpreter(&self) -> Option<&I> {
        self.interpreter.as_ref()
    }

    pub fn interpreter_mut(&mut self) -> Option<&mut I> {
        self.interpreter.as_mut()
    }
}

/// Whether the interpreter has a step left, closing steps included.
fn has_more<I: StoryInterpreter>(interpreter: &I) -> bool {
    interpreter.can_continue() || interpreter.can_finish()
}

/// Run interpreter steps until a pause tag or the end of available content.
///
/// Fragments are joined with a blank line and only the assembled result is
/// trimmed, so blank lines authored inside a fragment survive.
fn step_until_pause<I: StoryInterpreter>(interpreter: &mut I) -> Result<StepOutput, InterpreterError> {
    let mut text = String::new();
    let mut tags = Vec::new();

    while has_more(interpreter) {
        let fragment = interpreter.continue_step()?;
        text.push_str(&fragment);
        text.push_str(FRAGMENT_SEPARATOR);

        let step_tags = interpreter.current_tags();
        let paginate = step_tags.iter().any(|t| is_pagination_tag(t));
        let minigame = step_tags.iter().any(|t| is_minigame_tag(t));
        tags.extend(step_tags.iter().cloned());

        if paginate || minigame {
            break;
        }
    }

    Ok(StepOutput {
        text: text.trim().to_string(),
        tags,
    })
}
