//! Play Session - one playthrough of one story.
//!
//! Owns everything a playthrough mutates and keeps it consistent:
//! 1. **Engine**: paced text and choices from the interpreter
//! 2. **Burns**: hub exclusion state, reset and restored with the story
//! 3. **Minigames**: queued from step tags, results written back as a variable
//! 4. **Saves**: optional autosave after every beat that produced text
//!
//! Nothing here is global. Two sessions never share burned state.

use crate::config::GameConfig;
use crate::engine::{is_minigame_tag, NarrativeEngine, StepOutput, StoryHistory};
use crate::error::NarrativeError;
use crate::hubs::BurnTracker;
use crate::interpreter::{Choice, StoryInterpreter};
use crate::minigame::{parse_minigame_tag, MinigameController};
use crate::save::{SaveSnapshot, SaveStore};

/// Story variable that receives minigame outcomes: `-1` while a game is
/// running, then `1` for a win or `0` for a loss.
pub const MINIGAME_RESULT_VARIABLE: &str = "minigame_result";

const AUTOSAVE_NAME: &str = "Autosave";

#[derive(Debug)]
pub struct PlaySession<I> {
    config: GameConfig,

    /// Compiled story data, kept for restarts.
    story: Option<String>,

    engine: NarrativeEngine<I>,
    burns: BurnTracker,
    minigames: MinigameController,
    store: Option<SaveStore>,
}

impl<I: StoryInterpreter> PlaySession<I> {
    /// Create a session with its hub rules taken from `config`.
    pub fn new(config: GameConfig) -> Self {
        let burns = BurnTracker::new(config.hub_registry());
        Self {
            config,
            story: None,
            engine: NarrativeEngine::new(),
            burns,
            minigames: MinigameController::new(),
            store: None,
        }
    }

    /// Autosave into `store` after each beat that produces text.
    pub fn with_store(mut self, store: SaveStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Start the story from the beginning.
    ///
    /// Burns and minigames are cleared, configured variables are injected,
    /// and the first beat is played.
    pub fn new_game(&mut self, compiled: &str) -> Result<StepOutput, NarrativeError> {
        log::info!("Starting new game of '{}'", self.config.title);
        self.story = Some(compiled.to_string());
        self.burns.reset();
        self.minigames.reset();

        self.engine.init_story(compiled, None, None)?;
        for (name, value) in &self.config.variables {
            self.engine.set_global_variable(name, value.clone());
        }

        self.auto_continue()
    }

    /// Resume from a snapshot.
    ///
    /// The burned list is restored only when the interpreter accepted the
    /// saved state, so burns never outlive the position they belong to. A
    /// damaged burned list is dropped on its own and the resume goes ahead
    /// with nothing burned.
    pub fn resume(&mut self, compiled: &str, snapshot: &SaveSnapshot) -> Result<StepOutput, NarrativeError> {
        if snapshot.story_id != self.config.title {
            log::warn!(
                "Save '{}' belongs to '{}', resuming it in '{}'",
                snapshot.name,
                snapshot.story_id,
                self.config.title
            );
        }

        self.story = Some(compiled.to_string());
        self.minigames.reset();

        let restored = self
            .engine
            .init_story(compiled, Some(&snapshot.state), Some(&snapshot.text))?;
        self.burns.reset();
        if restored {
            self.burns.load_value(&snapshot.burned);
        }

        self.auto_continue()
    }

    /// Resume the newest save in the attached store, if any.
    pub fn resume_last(&mut self, compiled: &str) -> Result<Option<StepOutput>, NarrativeError> {
        let Some(snapshot) = self.store.as_ref().and_then(SaveStore::load_last) else {
            return Ok(None);
        };
        self.resume(compiled, &snapshot).map(Some)
    }

    /// Advance to the next pause. Does nothing while a minigame is playing.
    pub fn continue_story(&mut self) -> Result<StepOutput, NarrativeError> {
        if self.minigames.is_playing() {
            log::debug!("Ignoring continue while a minigame is playing");
            return Ok(StepOutput::default());
        }

        let output = self.engine.continue_story()?;
        self.after_step(&output);
        Ok(output)
    }

    /// Commit a choice and advance, without touching hub state.
    pub fn make_choice(&mut self, index: usize) -> Result<StepOutput, NarrativeError> {
        let output = self.engine.make_choice(index)?;
        self.after_step(&output);
        Ok(output)
    }

    /// Make a choice offered by hub `hub`, burning the branches its
    /// exclusion rule names before the story moves on.
    pub fn make_hub_choice(&mut self, hub: &str, index: usize) -> Result<StepOutput, NarrativeError> {
        let target = self
            .engine
            .choices()
            .get(index)
            .and_then(Choice::target_knot)
            .map(str::to_string);

        if let Some(target) = target {
            self.burns.handle_choice(hub, &target);
        }

        self.make_choice(index)
    }

    pub fn is_choice_burned(&self, choice: &Choice) -> bool {
        self.burns.is_choice_burned(choice)
    }

    /// Current choices that have not been burned.
    pub fn available_choices(&self) -> Vec<&Choice> {
        self.engine
            .choices()
            .iter()
            .filter(|choice| !self.burns.is_choice_burned(choice))
            .collect()
    }

    /// Start the queued minigame. Returns `false` if none is pending.
    pub fn start_minigame(&mut self) -> bool {
        if self.minigames.is_pending() {
            self.engine.set_global_variable(MINIGAME_RESULT_VARIABLE, -1);
        }
        self.minigames.start()
    }

    /// Commit the minigame outcome to the story and continue.
    pub fn finish_minigame(&mut self, won: bool) -> Result<StepOutput, NarrativeError> {
        let result = self.minigames.finish(won);
        self.engine.set_global_variable(MINIGAME_RESULT_VARIABLE, result);
        self.continue_story()
    }

    /// Abandon the running or queued minigame without a result.
    pub fn cancel_minigame(&mut self) {
        self.minigames.cancel();
    }

    /// Capture the current position, or `None` when no story is loaded.
    pub fn snapshot(&self, name: &str) -> Option<SaveSnapshot> {
        let state = self.engine.save_state()?;
        Some(SaveSnapshot::new(
            name,
            self.config.title.clone(),
            state,
            self.engine.text(),
            self.burns.export(),
        ))
    }

    /// Write the current position to a new named slot in the attached store.
    pub fn save_slot(&self, name: &str) -> Option<SaveSnapshot> {
        let store = self.store.as_ref()?;
        let snapshot = self.snapshot(name)?;
        match store.save_slot(&snapshot) {
            Ok(()) => Some(snapshot),
            Err(err) => {
                log::warn!("Could not save '{}': {}", name, err);
                None
            }
        }
    }

    /// Start over with the story that is already loaded.
    pub fn restart(&mut self) -> Result<StepOutput, NarrativeError> {
        let story = self.story.clone().ok_or(NarrativeError::NoStoryLoaded)?;
        self.new_game(&story)
    }

    /// Unload the playthrough. The story data is kept for a later restart.
    pub fn back_to_menu(&mut self) {
        self.engine.reset_story_state();
        self.burns.reset();
        self.minigames.reset();
    }

    fn auto_continue(&mut self) -> Result<StepOutput, NarrativeError> {
        if self.engine.text().is_empty() && self.engine.can_continue() {
            return self.continue_story();
        }
        Ok(StepOutput {
            text: self.engine.text().to_string(),
            tags: self.engine.current_tags().to_vec(),
        })
    }

    fn after_step(&mut self, output: &StepOutput) {
        self.process_tags(&output.tags);
        if !output.text.is_empty() {
            self.autosave();
        }
    }

    fn process_tags(&mut self, tags: &[String]) {
        let engine = &self.engine;
        for tag in tags.iter().filter(|tag| is_minigame_tag(tag)) {
            match parse_minigame_tag(tag, |name| engine.global_variable(name)) {
                Some(config) => self.minigames.queue(config),
                None => log::warn!("Ignoring malformed minigame tag '{}'", tag),
            }
        }
    }

    fn autosave(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let Some(snapshot) = self.snapshot(AUTOSAVE_NAME) else {
            return;
        };
        if let Err(err) = store.autosave(&snapshot) {
            log::warn!("Autosave failed: {}", err);
        }
    }
}

impl<I> PlaySession<I> {
    /// The configuration this session was created with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The underlying step engine.
    pub fn engine(&self) -> &NarrativeEngine<I> {
        &self.engine
    }

    /// Burned branches of this playthrough.
    pub fn burns(&self) -> &BurnTracker {
        &self.burns
    }

    /// The minigame lifecycle.
    pub fn minigames(&self) -> &MinigameController {
        &self.minigames
    }

    /// The attached save store, if any.
    pub fn store(&self) -> Option<&SaveStore> {
        self.store.as_ref()
    }

    /// Text currently on screen.
    pub fn text(&self) -> &str {
        self.engine.text()
    }

    /// Choices currently offered, burned ones included.
    pub fn choices(&self) -> &[Choice] {
        self.engine.choices()
    }

    /// Whether another continue would produce content.
    pub fn can_continue(&self) -> bool {
        self.engine.can_continue()
    }

    /// Whether the story has no content and no choices left.
    pub fn is_ended(&self) -> bool {
        self.engine.is_ended()
    }

    /// Everything shown so far in this playthrough.
    pub fn history(&self) -> &StoryHistory {
        self.engine.history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::VariableValue;
    use crate::minigame::MinigameState;
    use crate::testing::ScriptedInterpreter;
    use story_graph::{ExclusionRule, HubConfig};

    fn config() -> GameConfig {
        GameConfig::default()
            .with_hub(HubConfig::new("crossroads").with_option(ExclusionRule::new("forest").burns("river")))
            .with_variable("courage", 3)
    }

    fn crossroads() -> ScriptedInterpreter {
        ScriptedInterpreter::new()
            .declare("courage", 0)
            .declare(MINIGAME_RESULT_VARIABLE, 0)
            .beat("You reach a fork.", &[])
            .choice("Into the forest", Some("forest"), &[("Trees close in.", &[])])
            .choice("Down to the river", Some("river.bank"), &[("Water rushes.", &[])])
    }

    fn session() -> PlaySession<ScriptedInterpreter> {
        PlaySession::new(config())
    }

    #[test]
    fn test_new_game_plays_first_beat_and_injects_variables() {
        let mut session = session();
        let output = session.new_game(&crossroads().compile()).unwrap();

        assert_eq!(output.text, "You reach a fork.");
        assert_eq!(session.choices().len(), 2);
        assert_eq!(
            session.engine().global_variable("courage"),
            Some(VariableValue::Int(3))
        );
    }

    #[test]
    fn test_continue_without_story_fails() {
        let mut session = session();
        assert!(matches!(session.continue_story(), Err(NarrativeError::NoStoryLoaded)));
        assert!(matches!(session.restart(), Err(NarrativeError::NoStoryLoaded)));
    }

    #[test]
    fn test_hub_choice_burns_sibling_branch() {
        let mut session = session();
        session.new_game(&crossroads().compile()).unwrap();

        let river = session.choices()[1].clone();
        assert!(!session.is_choice_burned(&river));

        let output = session.make_hub_choice("crossroads", 0).unwrap();

        assert_eq!(output.text, "Trees close in.");
        assert!(session.burns().is_burned("river"));
        assert!(session.is_choice_burned(&river));
    }

    #[test]
    fn test_plain_choice_does_not_burn() {
        let mut session = session();
        session.new_game(&crossroads().compile()).unwrap();
        session.make_choice(0).unwrap();
        assert_eq!(session.burns().burned_count(), 0);
    }

    #[test]
    fn test_available_choices_skip_burned() {
        let story = crossroads().choice("Back home", Some("home"), &[]);
        let mut session = session();
        session.new_game(&story.compile()).unwrap();

        session.burns.load(["river"]);
        let texts: Vec<_> = session.available_choices().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Into the forest", "Back home"]);
    }

    #[test]
    fn test_restart_clears_burns() {
        let mut session = session();
        session.new_game(&crossroads().compile()).unwrap();
        session.make_hub_choice("crossroads", 0).unwrap();

        let output = session.restart().unwrap();

        assert_eq!(output.text, "You reach a fork.");
        assert_eq!(session.burns().burned_count(), 0);
    }

    #[test]
    fn test_minigame_round_trip() {
        let story = ScriptedInterpreter::new()
            .declare(MINIGAME_RESULT_VARIABLE, 0)
            .beat("A locked chest.", &["minigame:lockpick"])
            .beat("The lid opens.", &[]);
        let mut session = session();

        session.new_game(&story.compile()).unwrap();
        assert_eq!(session.minigames().state(), MinigameState::Pending);
        assert_eq!(session.minigames().config().unwrap().kind, "lockpick");

        assert!(session.start_minigame());
        assert_eq!(
            session.engine().global_variable(MINIGAME_RESULT_VARIABLE),
            Some(VariableValue::Int(-1))
        );

        // Continue is held while the game runs.
        assert_eq!(session.continue_story().unwrap(), StepOutput::default());
        assert_eq!(session.text(), "A locked chest.");

        let output = session.finish_minigame(true).unwrap();
        assert_eq!(output.text, "The lid opens.");
        assert_eq!(
            session.engine().global_variable(MINIGAME_RESULT_VARIABLE),
            Some(VariableValue::Int(1))
        );
        assert_eq!(session.minigames().state(), MinigameState::Idle);
    }

    #[test]
    fn test_start_minigame_without_queue() {
        let mut session = session();
        session.new_game(&crossroads().compile()).unwrap();

        assert!(!session.start_minigame());
        assert_eq!(
            session.engine().global_variable(MINIGAME_RESULT_VARIABLE),
            Some(VariableValue::Int(0))
        );
    }

    #[test]
    fn test_minigame_params_resolve_story_variables() {
        let story = ScriptedInterpreter::new()
            .declare("agility", 4)
            .beat("Pick it.", &["minigame: type=lockpick, speed={agility}"]);
        let mut session = session();
        session.new_game(&story.compile()).unwrap();

        let config = session.minigames().config().unwrap();
        assert_eq!(config.number("speed"), Some(4.0));
    }

    #[test]
    fn test_cancel_minigame_unblocks_continue() {
        let story = ScriptedInterpreter::new()
            .beat("Dodge!", &["minigame:qte"])
            .beat("It passes.", &[]);
        let mut session = session();
        session.new_game(&story.compile()).unwrap();
        session.start_minigame();

        session.cancel_minigame();

        assert_eq!(session.continue_story().unwrap().text, "It passes.");
    }

    #[test]
    fn test_snapshot_and_resume() {
        let mut session = session();
        session.new_game(&crossroads().compile()).unwrap();
        session.make_hub_choice("crossroads", 0).unwrap();
        let snapshot = session.snapshot("Chapter 1").unwrap();

        assert_eq!(snapshot.text, "Trees close in.");
        assert_eq!(snapshot.burned, serde_json::json!(["river"]));
        assert_eq!(snapshot.story_id, session.config().title);

        let mut resumed = PlaySession::<ScriptedInterpreter>::new(config());
        let output = resumed.resume(&crossroads().compile(), &snapshot).unwrap();

        assert_eq!(output.text, "Trees close in.");
        assert!(resumed.burns().is_burned("river"));
        assert!(resumed.is_ended());
    }

    #[test]
    fn test_resume_with_corrupt_state_drops_burns() {
        let snapshot = SaveSnapshot::new("Bad", "Untitled Story", "{corrupt", "Later", vec!["river".into()]);

        let mut session = session();
        let output = session.resume(&crossroads().compile(), &snapshot).unwrap();

        assert_eq!(output.text, "You reach a fork.");
        assert_eq!(session.burns().burned_count(), 0);
    }

    #[test]
    fn test_resume_with_damaged_burned_list_keeps_position() {
        let mut session = session();
        session.new_game(&crossroads().compile()).unwrap();
        session.make_hub_choice("crossroads", 0).unwrap();
        let mut snapshot = session.snapshot("Chapter 1").unwrap();
        snapshot.burned = serde_json::json!("river");

        let mut resumed = PlaySession::<ScriptedInterpreter>::new(config());
        resumed.burns.load(["stale"]);
        let output = resumed.resume(&crossroads().compile(), &snapshot).unwrap();

        assert_eq!(output.text, "Trees close in.");
        assert_eq!(resumed.burns().burned_count(), 0);
    }

    #[test]
    fn test_back_to_menu_unloads() {
        let mut session = session();
        assert!(session.snapshot("none").is_none());

        session.new_game(&crossroads().compile()).unwrap();
        session.make_hub_choice("crossroads", 0).unwrap();
        session.back_to_menu();

        assert!(!session.engine().is_loaded());
        assert_eq!(session.burns().burned_count(), 0);
        assert!(session.snapshot("none").is_none());
        assert_eq!(session.restart().unwrap().text, "You reach a fork.");
    }
}
